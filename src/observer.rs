//! Change notification
//!
//! Observers register a listener and get back a [`Subscription`] handle.
//! The handle is the only way to remove the listener again, so ownership of
//! the subscription is explicit. There is no global listener registry.

use crate::stack::StackView;
use crate::{trace_log, StackChangeEvent};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ids are unique across registries so a handle can't release a listener
/// it doesn't own.
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(0);

/// Listener invoked after every notified stack change
pub type Listener<P> = Box<dyn FnMut(&StackChangeEvent, &StackView<'_, P>) + Send>;

/// Handle for a registered listener
///
/// Pass it to `unsubscribe` to release the listener. Dropping the handle
/// leaves the listener registered for the lifetime of the stack.
#[must_use = "a subscription can only be released through its handle"]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Ordered set of listeners
pub struct Observers<P> {
    listeners: Vec<(u64, Listener<P>)>,
}

impl<P> Observers<P> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener; listeners run in registration order
    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&StackChangeEvent, &StackView<'_, P>) + Send + 'static,
    {
        let id = NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed);
        self.listeners.push((id, Box::new(listener)));
        trace_log!("Observer #{} subscribed ({} total)", id, self.listeners.len());
        Subscription { id }
    }

    /// Release a listener
    ///
    /// Returns `false` if the subscription belongs to another registry.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.id);
        let removed = self.listeners.len() != before;
        if removed {
            trace_log!("Observer #{} unsubscribed", subscription.id);
        }
        removed
    }

    /// Deliver one change to every listener
    pub fn emit(&mut self, event: &StackChangeEvent, view: &StackView<'_, P>) {
        trace_log!(
            "Notifying {} observers: {:?} -> {:?}",
            self.listeners.len(),
            event.from,
            event.to
        );
        for (_, listener) in &mut self.listeners {
            listener(event, view);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<P> Default for Observers<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Observers<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Location, NavigationDirection};
    use std::sync::{Arc, Mutex};

    fn event() -> StackChangeEvent {
        StackChangeEvent {
            from: None,
            to: Some(Location::root()),
            direction: NavigationDirection::Forward,
            depth: 1,
        }
    }

    #[test]
    fn test_emit_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut observers: Observers<()> = Observers::new();

        for name in ["first", "second"] {
            let log = Arc::clone(&log);
            let _sub = observers.subscribe(move |_, _| log.lock().unwrap().push(name));
        }

        let locations = [Location::root()];
        let pages = [()];
        observers.emit(&event(), &StackView::new(&locations, &pages));

        assert_eq!(*log.lock().unwrap(), ["first", "second"]);
    }

    #[test]
    fn test_listener_sees_view() {
        let seen = Arc::new(Mutex::new(None));
        let mut observers: Observers<&'static str> = Observers::new();
        let seen_in = Arc::clone(&seen);
        let _sub = observers.subscribe(move |event, view| {
            *seen_in.lock().unwrap() = Some((event.depth, view.top_page().copied()));
        });

        let locations = [Location::root()];
        let pages = ["home"];
        observers.emit(&event(), &StackView::new(&locations, &pages));

        assert_eq!(*seen.lock().unwrap(), Some((1, Some("home"))));
    }

    #[test]
    fn test_unsubscribe() {
        let count = Arc::new(Mutex::new(0));
        let mut observers: Observers<()> = Observers::new();
        let count_in = Arc::clone(&count);
        let sub = observers.subscribe(move |_, _| *count_in.lock().unwrap() += 1);
        let other = observers.subscribe(|_, _| {});
        assert_eq!(observers.len(), 2);

        assert!(observers.unsubscribe(sub));
        assert_eq!(observers.len(), 1);

        let locations = [Location::root()];
        observers.emit(&event(), &StackView::new(&locations, &[()]));
        assert_eq!(*count.lock().unwrap(), 0);

        assert!(observers.unsubscribe(other));
        assert!(observers.is_empty());
    }

    #[test]
    fn test_foreign_subscription_is_rejected() {
        let mut a: Observers<()> = Observers::new();
        let mut b: Observers<()> = Observers::new();
        let _first = a.subscribe(|_, _| {});
        let second = a.subscribe(|_, _| {});
        let _own = b.subscribe(|_, _| {});

        assert!(!b.unsubscribe(second));
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
    }
}
