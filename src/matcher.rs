//! Regex route patterns
//!
//! A [`RoutePattern`] is a compiled regular expression tested against the
//! path component of a [`Location`]. Query and fragment never take part in
//! matching. Patterns are searched, not implicitly anchored: use `^` and `$`
//! to require a whole-path match.

use crate::error::StackError;
use crate::location::Location;
use crate::params::RouteParams;
use crate::RouteMatch;
use regex::Regex;
use std::fmt;

/// A compiled route pattern
#[derive(Clone)]
pub struct RoutePattern {
    regex: Regex,
}

impl RoutePattern {
    /// Compile a pattern
    ///
    /// # Example
    ///
    /// ```
    /// use route_stack::RoutePattern;
    ///
    /// let pattern = RoutePattern::new(r"^/users/(?P<id>\d+)$").unwrap();
    /// assert!(pattern.is_match("/users/7"));
    /// assert!(!pattern.is_match("/users/me"));
    /// assert!(RoutePattern::new("^/(").is_err());
    /// ```
    pub fn new(pattern: &str) -> Result<Self, StackError> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|e| StackError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    /// Pattern source text
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Names of the named capture groups, in pattern order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.regex.capture_names().flatten()
    }

    /// Match a location's path, collecting positional and named captures
    ///
    /// The returned match carries route index 0; the table that owns the
    /// pattern overwrites it.
    pub fn matches(&self, location: &Location) -> Option<RouteMatch> {
        let path = location.path();
        let captures = self.regex.captures(path)?;

        let groups = captures
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();

        let mut params = RouteParams::new();
        for name in self.param_names() {
            if let Some(value) = captures.name(name) {
                params.insert(name, value.as_str());
            }
        }

        Some(RouteMatch {
            path: path.to_string(),
            groups,
            params,
            query: location.query_params(),
            route_index: 0,
        })
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for RoutePattern {}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RoutePattern").field(&self.as_str()).finish()
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
