//! Route table and page builders

use crate::error::StackError;
use crate::location::Location;
use crate::matcher::RoutePattern;
use crate::{debug_log, trace_log, RouteMatch};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Page builders
// ============================================================================

/// Function that builds a page for a location.
///
/// The match is `None` when the page is built by the fallback builder.
pub type PageBuilder<P> = Arc<dyn Fn(&Location, Option<&RouteMatch>) -> P + Send + Sync>;

/// Page types that can stand in for a missing route.
///
/// Used when no route matches and the table has no fallback builder.
pub trait NotFoundPage {
    fn not_found(location: &Location) -> Self;
}

impl NotFoundPage for String {
    fn not_found(location: &Location) -> Self {
        format!("Page not found: {}", location)
    }
}

impl NotFoundPage for () {
    fn not_found(_location: &Location) -> Self {}
}

impl<T> NotFoundPage for Option<T> {
    fn not_found(_location: &Location) -> Self {
        None
    }
}

// ============================================================================
// RouteEntry
// ============================================================================

/// A pattern and the builder it dispatches to
pub struct RouteEntry<P> {
    pattern: RoutePattern,
    builder: PageBuilder<P>,
    name: Option<String>,
}

impl<P> RouteEntry<P> {
    pub fn new(pattern: RoutePattern, builder: PageBuilder<P>) -> Self {
        Self {
            pattern,
            builder,
            name: None,
        }
    }

    /// Set a name used in diagnostics
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Build the page for a matched location
    pub fn build(&self, location: &Location, route_match: &RouteMatch) -> P {
        (self.builder)(location, Some(route_match))
    }
}

impl<P> Clone for RouteEntry<P> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            builder: Arc::clone(&self.builder),
            name: self.name.clone(),
        }
    }
}

impl<P> fmt::Debug for RouteEntry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern)
            .field("name", &self.name)
            .finish()
    }
}

// ============================================================================
// RouteTable
// ============================================================================

/// Ordered list of routes plus an optional fallback builder.
///
/// Routes are tried in insertion order and the first pattern that matches
/// the location's path wins. Later routes that match the same path are
/// silently shadowed.
///
/// # Example
///
/// ```
/// use route_stack::{Location, RouteTable};
///
/// let table = RouteTable::new()
///     .route("^/$", |_, _| "root".to_string())
///     .route(r"^/users/(?P<id>\d+)$", |_, m| {
///         format!("user {}", m.and_then(|m| m.params.get("id")).unwrap_or("?"))
///     })
///     .fallback(|location, _| format!("missing {}", location));
///
/// assert_eq!(table.build(&Location::new("/users/7")), "user 7");
/// assert_eq!(table.build(&Location::new("/nope")), "missing /nope");
/// ```
pub struct RouteTable<P> {
    routes: Vec<RouteEntry<P>>,
    fallback: Option<PageBuilder<P>>,
}

impl<P> RouteTable<P> {
    /// Create an empty table with no fallback
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            fallback: None,
        }
    }

    /// Append a route
    ///
    /// # Panics
    ///
    /// Panics if the pattern is not a valid regex. Use `try_route` to handle
    /// the error instead.
    pub fn route<F>(self, pattern: &str, builder: F) -> Self
    where
        F: Fn(&Location, Option<&RouteMatch>) -> P + Send + Sync + 'static,
    {
        match self.try_route(pattern, builder) {
            Ok(table) => table,
            Err(e) => panic!("{}", e),
        }
    }

    /// Append a route, returning an error for an invalid pattern
    pub fn try_route<F>(mut self, pattern: &str, builder: F) -> Result<Self, StackError>
    where
        F: Fn(&Location, Option<&RouteMatch>) -> P + Send + Sync + 'static,
    {
        let pattern = RoutePattern::new(pattern)?;
        self.routes.push(RouteEntry::new(pattern, Arc::new(builder)));
        Ok(self)
    }

    /// Append a named route
    ///
    /// # Panics
    ///
    /// Panics if the pattern is not a valid regex.
    pub fn named_route<F>(self, name: impl Into<String>, pattern: &str, builder: F) -> Self
    where
        F: Fn(&Location, Option<&RouteMatch>) -> P + Send + Sync + 'static,
    {
        let mut table = self.route(pattern, builder);
        if let Some(entry) = table.routes.last_mut() {
            entry.name = Some(name.into());
        }
        table
    }

    /// Append a pre-built entry
    pub fn entry(mut self, entry: RouteEntry<P>) -> Self {
        self.routes.push(entry);
        self
    }

    /// Set the builder used when no route matches
    pub fn fallback<F>(mut self, builder: F) -> Self
    where
        F: Fn(&Location, Option<&RouteMatch>) -> P + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(builder));
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn entries(&self) -> &[RouteEntry<P>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the first route whose pattern matches the location's path
    pub fn resolve(&self, location: &Location) -> Option<(&RouteEntry<P>, RouteMatch)> {
        trace_log!(
            "Resolving '{}' against {} routes",
            location.path(),
            self.routes.len()
        );

        self.routes
            .iter()
            .enumerate()
            .find_map(|(index, entry)| self.match_entry(index, entry, location))
    }

    /// Re-run a single route against a location
    ///
    /// Returns `None` if the index is out of range or the route no longer
    /// matches.
    pub fn match_at(&self, index: usize, location: &Location) -> Option<(&RouteEntry<P>, RouteMatch)> {
        let entry = self.routes.get(index)?;
        self.match_entry(index, entry, location)
    }

    fn match_entry<'a>(
        &self,
        index: usize,
        entry: &'a RouteEntry<P>,
        location: &Location,
    ) -> Option<(&'a RouteEntry<P>, RouteMatch)> {
        let mut route_match = entry.pattern.matches(location)?;
        route_match.route_index = index;
        trace_log!(
            "'{}' matched route #{} ({})",
            location.path(),
            index,
            entry.pattern
        );
        Some((entry, route_match))
    }

    /// Build with the fallback builder, or the built-in not-found page
    pub fn build_fallback(&self, location: &Location) -> P
    where
        P: NotFoundPage,
    {
        match &self.fallback {
            Some(fallback) => {
                debug_log!("No route matched '{}', using fallback", location);
                fallback(location, None)
            }
            None => {
                debug_log!(
                    "No route matched '{}' and no fallback set, using not-found page",
                    location
                );
                P::not_found(location)
            }
        }
    }

    /// Resolve and build the page for a location
    pub fn build(&self, location: &Location) -> P
    where
        P: NotFoundPage,
    {
        match self.resolve(location) {
            Some((entry, route_match)) => entry.build(location, &route_match),
            None => self.build_fallback(location),
        }
    }
}

impl<P> Default for RouteTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for RouteTable<P> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl<P> fmt::Debug for RouteTable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
