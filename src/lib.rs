//! # Route Stack
//!
//! A navigation stack engine, independent of any UI toolkit:
//!
//! - **Route Table** - Ordered regex patterns, first match wins, with a fallback builder
//! - **Navigation Stack** - Push, pop, clear and pop-until over location/page pairs
//! - **Awaitable Results** - Push a location and await the value it is popped with
//! - **Batched Notifications** - Bulk operations notify observers exactly once
//! - **Resolution Cache** - Optional LRU memo of path lookups
//!
//! Pages are opaque: the stack stores whatever the route builders return and
//! hands it back through read-only views.
//!
//! # Quick Start
//!
//! ```
//! use route_stack::{RouteStack, RouteTable};
//!
//! let table = RouteTable::new()
//!     .route("^/home$", |_, _| "Home".to_string())
//!     .route(r"^/users/(?P<id>\d+)$", |_, m| {
//!         let id = m.and_then(|m| m.params.get("id")).unwrap_or_default();
//!         format!("User {}", id)
//!     })
//!     .fallback(|location, _| format!("Nothing at {}", location));
//!
//! // Seeded with "/" (built by the fallback)
//! let mut stack: RouteStack<String> = RouteStack::new(table);
//!
//! let _subscription = stack.subscribe(|event, view| {
//!     println!("{:?} -> {:?} ({} frames)", event.from, event.to, view.len());
//! });
//!
//! stack.push_location("/home");
//! stack.push_location("/users/7");
//! assert_eq!(stack.pages(), ["Nothing at /", "Home", "User 7"]);
//!
//! stack.remove_until("/home").unwrap();
//! assert_eq!(stack.locations(), ["/", "/home"]);
//! ```
//!
//! # Awaiting results
//!
//! ```
//! use route_stack::{RouteStack, RouteTable};
//!
//! let table = RouteTable::new().fallback(|location, _| location.to_string());
//! let mut stack: RouteStack<String, bool> = RouteStack::builder(table)
//!     .initial_locations(["/", "/settings"])
//!     .build();
//!
//! // Anchored at "/settings", the current top
//! let confirmed = stack.push_and_await("/confirm");
//!
//! // Popping back to "/settings" delivers the value
//! stack.remove_last_with_value(true).unwrap();
//! assert_eq!(pollster::block_on(confirmed), Ok(true));
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU cache for path resolution

#![doc(html_root_url = "https://docs.rs/route-stack/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Core modules
pub mod location;
pub mod matcher;
pub mod params;
pub mod route;
pub mod stack;

// Results and notification
pub mod observer;
pub mod pending;

// Error handling
pub mod error;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::{CacheStats, RouteCache};
pub use error::{Result, StackError};
pub use location::Location;
pub use matcher::RoutePattern;
pub use observer::{Listener, Observers, Subscription};
pub use params::{QueryParams, RouteParams};
pub use pending::{AwaitPolicy, PendingResult};
pub use route::{NotFoundPage, PageBuilder, RouteEntry, RouteTable};
pub use stack::{RouteStack, RouteStackBuilder, StackView};

/// Route matching result handed to page builders.
///
/// # Example
///
/// ```
/// use route_stack::{Location, RoutePattern};
///
/// let pattern = RoutePattern::new(r"^/users/(?P<id>\d+)$").unwrap();
/// let route_match = pattern.matches(&Location::new("/users/123?tab=posts")).unwrap();
///
/// assert_eq!(route_match.params.get("id"), Some("123"));
/// assert_eq!(route_match.group(1), Some("123"));
/// assert_eq!(route_match.query.get("tab"), Some("posts"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// The matched path (query and fragment stripped)
    pub path: String,
    /// Positional capture groups; index 0 is the whole match
    pub groups: Vec<Option<String>>,
    /// Named capture groups
    pub params: RouteParams,
    /// Decoded query string of the location
    pub query: QueryParams,
    /// Index of the matching route in its table
    pub route_index: usize,
}

impl RouteMatch {
    /// Positional capture group, `None` if it did not participate
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index)?.as_deref()
    }
}

/// Navigation direction indicator.
///
/// Tells observers how the top of the stack moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    /// Locations were pushed
    Forward,
    /// Locations were popped or removed
    Back,
    /// The stack was cleared or popped and pushed in one change
    Replace,
}

impl NavigationDirection {
    /// Direction implied by a depth change
    pub fn infer(before: usize, after: usize) -> Self {
        match after.cmp(&before) {
            std::cmp::Ordering::Greater => Self::Forward,
            std::cmp::Ordering::Less => Self::Back,
            std::cmp::Ordering::Equal => Self::Replace,
        }
    }
}

/// Event broadcast to observers after a stack change.
///
/// A batched operation produces one event whose `from` is the top before the
/// batch began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackChangeEvent {
    /// Top location before the change (None if the stack was empty)
    pub from: Option<Location>,
    /// Top location after the change (None if the stack is now empty)
    pub to: Option<Location>,
    /// How the top moved
    pub direction: NavigationDirection,
    /// Stack length after the change
    pub depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_inference() {
        assert_eq!(NavigationDirection::infer(1, 3), NavigationDirection::Forward);
        assert_eq!(NavigationDirection::infer(3, 1), NavigationDirection::Back);
        assert_eq!(NavigationDirection::infer(2, 2), NavigationDirection::Replace);
    }

    #[test]
    fn test_group_out_of_range() {
        let route_match = RouteMatch {
            path: "/".to_string(),
            groups: vec![Some("/".to_string())],
            params: RouteParams::new(),
            query: QueryParams::new(),
            route_index: 0,
        };
        assert_eq!(route_match.group(0), Some("/"));
        assert_eq!(route_match.group(1), None);
    }
}
