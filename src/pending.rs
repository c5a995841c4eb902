//! Awaitable navigation results
//!
//! `push_and_await` records the location on top of the stack (the anchor)
//! and hands back a [`PendingResult`]. A later pop that exposes a location
//! with the anchor's path, and that supplies a value, completes it.
//!
//! Anchors are compared by path only; query and fragment are ignored.

use crate::error::StackError;
use crate::location::Location;
use crate::{trace_log, warn_log};
use futures::channel::oneshot;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// How concurrent `push_and_await` calls are tracked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AwaitPolicy {
    /// One outstanding result; a new await abandons the previous one
    #[default]
    Single,
    /// Results stack up; each pop completes the most recent result
    /// anchored at the exposed location and abandons any newer ones
    Nested,
}

/// Future resolving to the value supplied when the awaited location is popped
///
/// Completes with [`StackError::ResultAbandoned`] when the result is
/// discarded without a value: replaced under [`AwaitPolicy::Single`],
/// popped past under [`AwaitPolicy::Nested`], dropped with the stack, or
/// requested while the stack was empty (no anchor).
pub struct PendingResult<R> {
    anchor: Option<Location>,
    receiver: oneshot::Receiver<R>,
}

impl<R> PendingResult<R> {
    /// Location that was on top when the await began
    pub fn anchor(&self) -> Option<&Location> {
        self.anchor.as_ref()
    }

    /// Take the value without waiting
    ///
    /// `Ok(None)` while still pending.
    pub fn try_take(&mut self) -> Result<Option<R>, StackError> {
        self.receiver.try_recv().map_err(|_| self.abandoned())
    }

    fn abandoned(&self) -> StackError {
        StackError::ResultAbandoned {
            anchor: self.anchor.clone(),
        }
    }
}

impl<R> Unpin for PendingResult<R> {}

impl<R> Future for PendingResult<R> {
    type Output = Result<R, StackError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(value)) => Poll::Ready(Ok(value)),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(this.abandoned())),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<R> fmt::Debug for PendingResult<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResult")
            .field("anchor", &self.anchor)
            .finish()
    }
}

struct Correlation<R> {
    anchor: Location,
    sender: oneshot::Sender<R>,
}

/// Outstanding correlations, oldest first
pub(crate) struct PendingResults<R> {
    policy: AwaitPolicy,
    slots: Vec<Correlation<R>>,
}

impl<R> PendingResults<R> {
    pub(crate) fn new(policy: AwaitPolicy) -> Self {
        Self {
            policy,
            slots: Vec::new(),
        }
    }

    pub(crate) fn policy(&self) -> AwaitPolicy {
        self.policy
    }

    /// Live correlations whose receiver has not been dropped
    pub(crate) fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|c| !c.sender.is_canceled())
            .count()
    }

    /// Open a correlation anchored at `anchor`
    ///
    /// Without an anchor nothing can ever complete it, so the returned
    /// future is abandoned immediately.
    pub(crate) fn register(&mut self, anchor: Option<Location>) -> PendingResult<R> {
        let (sender, receiver) = oneshot::channel();
        self.prune();

        if self.policy == AwaitPolicy::Single {
            if let Some(previous) = self.slots.first() {
                warn_log!(
                    "Abandoning pending result anchored at '{}'",
                    previous.anchor
                );
            }
            self.slots.clear();
        }

        match &anchor {
            Some(location) => {
                trace_log!("Awaiting result anchored at '{}'", location);
                self.slots.push(Correlation {
                    anchor: location.clone(),
                    sender,
                });
            }
            None => {
                warn_log!("push_and_await on an empty stack has no anchor; result abandoned");
                drop(sender);
            }
        }

        PendingResult { anchor, receiver }
    }

    /// Deliver `value` to the correlation anchored at `target`'s path
    ///
    /// Returns `false` without side effects on the matched slot when no
    /// live correlation has that anchor.
    pub(crate) fn complete(&mut self, target: &Location, value: R) -> bool {
        self.prune();

        let Some(index) = self.slots.iter().rposition(|c| c.anchor.same_path(target)) else {
            trace_log!("No pending result anchored at '{}'", target.path());
            return false;
        };

        let newer = self.slots.len() - index - 1;
        if newer > 0 {
            warn_log!(
                "Abandoning {} pending result(s) above '{}'",
                newer,
                target.path()
            );
        }
        self.slots.truncate(index + 1);

        let Some(correlation) = self.slots.pop() else {
            return false;
        };
        let delivered = correlation.sender.send(value).is_ok();
        trace_log!(
            "Pending result anchored at '{}' completed: {}",
            correlation.anchor,
            delivered
        );
        delivered
    }

    /// Drop correlations whose future was dropped by the caller
    fn prune(&mut self) {
        self.slots.retain(|c| !c.sender.is_canceled());
    }
}

impl<R> fmt::Debug for PendingResults<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResults")
            .field("policy", &self.policy)
            .field(
                "anchors",
                &self.slots.iter().map(|c| &c.anchor).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(raw: &str) -> Location {
        Location::new(raw)
    }

    #[test]
    fn test_complete_matching_anchor() {
        let mut pending = PendingResults::new(AwaitPolicy::Single);
        let mut result = pending.register(Some(loc("/home")));

        assert_eq!(result.try_take(), Ok(None));
        assert!(pending.complete(&loc("/home"), 42));
        assert_eq!(result.try_take(), Ok(Some(42)));
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn test_anchor_compares_path_only() {
        let mut pending = PendingResults::new(AwaitPolicy::Single);
        let result = pending.register(Some(loc("/home?tab=1")));

        assert!(pending.complete(&loc("/home#section"), "done"));
        assert_eq!(pollster::block_on(result), Ok("done"));
    }

    #[test]
    fn test_non_matching_target_keeps_correlation() {
        let mut pending = PendingResults::new(AwaitPolicy::Single);
        let mut result = pending.register(Some(loc("/home")));

        assert!(!pending.complete(&loc("/other"), 1));
        assert_eq!(pending.len(), 1);
        assert_eq!(result.try_take(), Ok(None));
    }

    #[test]
    fn test_second_completion_is_noop() {
        let mut pending = PendingResults::new(AwaitPolicy::Single);
        let result = pending.register(Some(loc("/home")));

        assert!(pending.complete(&loc("/home"), 1));
        assert!(!pending.complete(&loc("/home"), 2));
        assert_eq!(pollster::block_on(result), Ok(1));
    }

    #[test]
    fn test_single_policy_abandons_previous() {
        let mut pending = PendingResults::new(AwaitPolicy::Single);
        let first = pending.register(Some(loc("/a")));
        let second = pending.register(Some(loc("/b")));
        assert_eq!(pending.len(), 1);

        let error = pollster::block_on(first).unwrap_err();
        assert_eq!(
            error,
            StackError::ResultAbandoned {
                anchor: Some(loc("/a"))
            }
        );

        assert!(!pending.complete(&loc("/a"), 1));
        assert!(pending.complete(&loc("/b"), 2));
        assert_eq!(pollster::block_on(second), Ok(2));
    }

    #[test]
    fn test_single_policy_abandons_previous_without_anchor() {
        let mut pending: PendingResults<i32> = PendingResults::new(AwaitPolicy::Single);
        let first = pending.register(Some(loc("/a")));
        let second = pending.register(None);

        assert_eq!(pending.len(), 0);
        assert!(!pending.complete(&loc("/a"), 1));
        assert!(pollster::block_on(first).unwrap_err().is_abandoned());
        assert!(pollster::block_on(second).unwrap_err().is_abandoned());
    }

    #[test]
    fn test_nested_policy_keeps_outer_without_anchor() {
        let mut pending = PendingResults::new(AwaitPolicy::Nested);
        let outer = pending.register(Some(loc("/a")));
        let _unanchored = pending.register(None);

        assert_eq!(pending.len(), 1);
        assert!(pending.complete(&loc("/a"), 7));
        assert_eq!(pollster::block_on(outer), Ok(7));
    }

    #[test]
    fn test_nested_policy_is_lifo() {
        let mut pending = PendingResults::new(AwaitPolicy::Nested);
        let outer = pending.register(Some(loc("/a")));
        let inner = pending.register(Some(loc("/b")));
        assert_eq!(pending.len(), 2);

        assert!(pending.complete(&loc("/b"), "inner"));
        assert!(pending.complete(&loc("/a"), "outer"));

        assert_eq!(pollster::block_on(inner), Ok("inner"));
        assert_eq!(pollster::block_on(outer), Ok("outer"));
    }

    #[test]
    fn test_nested_policy_abandons_skipped_results() {
        let mut pending = PendingResults::new(AwaitPolicy::Nested);
        let outer = pending.register(Some(loc("/a")));
        let inner = pending.register(Some(loc("/b")));

        // Popping straight back to /a skips the result anchored at /b
        assert!(pending.complete(&loc("/a"), 7));

        assert_eq!(pollster::block_on(outer), Ok(7));
        assert!(pollster::block_on(inner).unwrap_err().is_abandoned());
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn test_missing_anchor_is_abandoned_immediately() {
        let mut pending = PendingResults::<u8>::new(AwaitPolicy::Single);
        let mut result = pending.register(None);

        assert!(result.anchor().is_none());
        assert!(result.try_take().unwrap_err().is_abandoned());
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn test_dropped_future_is_pruned() {
        let mut pending = PendingResults::new(AwaitPolicy::Nested);
        let kept = pending.register(Some(loc("/a")));
        drop(pending.register(Some(loc("/b"))));

        assert_eq!(pending.len(), 1);
        assert!(!pending.complete(&loc("/b"), 1));
        assert!(pending.complete(&loc("/a"), 2));
        assert_eq!(pollster::block_on(kept), Ok(2));
    }
}
