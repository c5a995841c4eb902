//! Logging facade
//!
//! The stack logs through whichever backend the crate was compiled with:
//!
//! - `log` (default) - records go to the `log` crate
//! - `tracing` - records go to the `tracing` crate as events
//!
//! Enable exactly one of the two. With neither enabled every macro expands
//! to nothing and the arguments are not evaluated.
//!
//! # Usage
//!
//! ```ignore
//! use route_stack::{debug_log, trace_log};
//!
//! trace_log!("resolving '{}'", path);
//! debug_log!("stack depth is now {}", depth);
//! ```

/// Dispatch a record to the active backend. Internal to the level macros.
#[doc(hidden)]
#[macro_export]
macro_rules! __stack_log {
    ($level:ident, $($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::$level!($($arg)*);
        #[cfg(feature = "log")]
        ::log::$level!($($arg)*);
    };
}

/// Trace-level record: resolution walks, cache lookups, notification fan-out.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        $crate::__stack_log!(trace, $($arg)*)
    };
}

/// Debug-level record: stack mutations and fallbacks.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::__stack_log!(debug, $($arg)*)
    };
}

/// Info-level record.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        $crate::__stack_log!(info, $($arg)*)
    };
}

/// Warn-level record: abandoned results, rejected removals.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        $crate::__stack_log!(warn, $($arg)*)
    };
}

/// Error-level record.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        $crate::__stack_log!(error, $($arg)*)
    };
}
