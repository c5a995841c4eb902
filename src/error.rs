//! Error types for stack operations
//!
//! Only well-defined failures are represented here. A path that matches no
//! route is not an error: the stack falls back to the configured fallback
//! builder or to [`NotFoundPage`](crate::NotFoundPage). Completing a result
//! that is already resolved or absent is a silent no-op.

use crate::location::Location;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = StackError> = std::result::Result<T, E>;

/// Errors returned by [`RouteStack`](crate::RouteStack) and
/// [`RouteTable`](crate::RouteTable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StackError {
    /// A remove operation targeted a location that is not on the stack
    #[error("location not found on stack: {location}")]
    LocationNotFound { location: Location },

    /// `remove_last` on a stack with no entries
    #[error("cannot remove from an empty stack")]
    EmptyStack,

    /// A route pattern failed to compile
    #[error("invalid route pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// The awaited result was dropped before a value arrived
    #[error("pending result anchored at {anchor:?} was abandoned")]
    ResultAbandoned { anchor: Option<Location> },
}

impl StackError {
    pub(crate) fn not_found(location: &Location) -> Self {
        Self::LocationNotFound {
            location: location.clone(),
        }
    }

    /// Check if this is a missing-location error
    pub fn is_location_not_found(&self) -> bool {
        matches!(self, Self::LocationNotFound { .. })
    }

    /// Check if this error means an awaited result will never arrive
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Self::ResultAbandoned { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_not_found_display() {
        let error = StackError::not_found(&Location::from("/missing?x=1"));
        assert_eq!(
            error.to_string(),
            "location not found on stack: /missing?x=1"
        );
        assert!(error.is_location_not_found());
        assert!(!error.is_abandoned());
    }

    #[test]
    fn test_empty_stack_display() {
        assert_eq!(
            StackError::EmptyStack.to_string(),
            "cannot remove from an empty stack"
        );
    }

    #[test]
    fn test_invalid_pattern_display() {
        let error = StackError::InvalidPattern {
            pattern: "^/(".to_string(),
            message: "unclosed group".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "invalid route pattern '^/(': unclosed group"
        );
    }

    #[test]
    fn test_abandoned() {
        let error = StackError::ResultAbandoned {
            anchor: Some(Location::from("/home")),
        };
        assert!(error.is_abandoned());
        assert!(error.to_string().contains("abandoned"));
    }
}
