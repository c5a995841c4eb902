//! Navigation stack state
//!
//! [`RouteStack`] owns two parallel sequences, locations and the pages built
//! for them. Every mutation touches both in the same step, so
//! `locations().len() == pages().len()` and `locations()[i]` produced
//! `pages()[i]` at all times, including in the middle of a batch.

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, RouteCache};
use crate::error::{Result, StackError};
use crate::location::Location;
use crate::observer::{Observers, Subscription};
use crate::pending::{AwaitPolicy, PendingResult, PendingResults};
use crate::route::{NotFoundPage, RouteTable};
use crate::{debug_log, info_log, trace_log, warn_log, NavigationDirection, StackChangeEvent};
use std::fmt;
use std::marker::PhantomData;
#[cfg(feature = "cache")]
use std::num::NonZeroUsize;

// ============================================================================
// StackView
// ============================================================================

/// Read-only view of the stack handed to observers
pub struct StackView<'a, P> {
    locations: &'a [Location],
    pages: &'a [P],
}

impl<'a, P> StackView<'a, P> {
    /// Pair two index-aligned slices
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    pub fn new(locations: &'a [Location], pages: &'a [P]) -> Self {
        assert_eq!(
            locations.len(),
            pages.len(),
            "locations and pages must be index-aligned"
        );
        Self { locations, pages }
    }

    pub fn locations(&self) -> &'a [Location] {
        self.locations
    }

    pub fn pages(&self) -> &'a [P] {
        self.pages
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn top(&self) -> Option<&'a Location> {
        self.locations.last()
    }

    pub fn top_page(&self) -> Option<&'a P> {
        self.pages.last()
    }

    /// Frame at `index`, bottom first
    pub fn get(&self, index: usize) -> Option<(&'a Location, &'a P)> {
        Some((self.locations.get(index)?, self.pages.get(index)?))
    }

    /// Frames from bottom to top
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&'a Location, &'a P)> + 'a {
        self.locations.iter().zip(self.pages.iter())
    }

    /// Index of the first frame whose location equals `location`
    pub fn position(&self, location: &Location) -> Option<usize> {
        self.locations.iter().position(|l| l == location)
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.position(location).is_some()
    }
}

impl<P> Clone for StackView<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for StackView<'_, P> {}

impl<P: fmt::Debug> fmt::Debug for StackView<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Configuration for a [`RouteStack`]
///
/// # Example
///
/// ```
/// use route_stack::{AwaitPolicy, RouteStack, RouteTable};
///
/// let table = RouteTable::new().route("^/home$", |_, _| "home".to_string());
/// let stack: RouteStack<String, u32> = RouteStack::builder(table)
///     .initial_locations(["/", "/home"])
///     .await_policy(AwaitPolicy::Nested)
///     .build();
///
/// assert_eq!(stack.locations(), ["/", "/home"]);
/// ```
pub struct RouteStackBuilder<P, R = ()> {
    table: RouteTable<P>,
    initial_locations: Option<Vec<Location>>,
    skip_first_push: bool,
    await_policy: AwaitPolicy,
    #[cfg(feature = "cache")]
    cache_capacity: usize,
    _result: PhantomData<fn() -> R>,
}

impl<P, R> RouteStackBuilder<P, R> {
    fn new(table: RouteTable<P>) -> Self {
        Self {
            table,
            initial_locations: None,
            skip_first_push: false,
            await_policy: AwaitPolicy::default(),
            #[cfg(feature = "cache")]
            cache_capacity: RouteCache::DEFAULT_CAPACITY,
            _result: PhantomData,
        }
    }

    /// Locations seeded at construction, bottom first
    ///
    /// Defaults to a single `/`. Seeding does not notify.
    pub fn initial_locations<I>(mut self, locations: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Location>,
    {
        self.initial_locations = Some(locations.into_iter().map(Into::into).collect());
        self
    }

    /// Ignore the first `push_location` after construction
    ///
    /// For hosts that report the initial location again right after
    /// startup, when it is already on the stack from seeding.
    pub fn skip_first_push(mut self, skip: bool) -> Self {
        self.skip_first_push = skip;
        self
    }

    pub fn await_policy(mut self, policy: AwaitPolicy) -> Self {
        self.await_policy = policy;
        self
    }

    /// Size of the path resolution cache; 0 disables it
    #[cfg(feature = "cache")]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Seed the stack and return it
    pub fn build(self) -> RouteStack<P, R>
    where
        P: NotFoundPage,
    {
        let mut stack = RouteStack {
            table: self.table,
            locations: Vec::new(),
            pages: Vec::new(),
            pending: PendingResults::new(self.await_policy),
            observers: Observers::new(),
            skip_next_push: false,
            batching: false,
            #[cfg(feature = "cache")]
            cache: NonZeroUsize::new(self.cache_capacity).map(RouteCache::with_capacity),
        };

        let initial = self
            .initial_locations
            .unwrap_or_else(|| vec![Location::root()]);
        for location in initial {
            stack.push_frame(location);
        }
        stack.skip_next_push = self.skip_first_push;

        info_log!(
            "Route stack ready: {} routes, {} seeded locations",
            stack.table.len(),
            stack.len()
        );
        stack
    }
}

impl<P, R> fmt::Debug for RouteStackBuilder<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteStackBuilder")
            .field("table", &self.table)
            .field("initial_locations", &self.initial_locations)
            .field("skip_first_push", &self.skip_first_push)
            .field("await_policy", &self.await_policy)
            .finish()
    }
}

// ============================================================================
// RouteStack
// ============================================================================

/// Ordered stack of locations and their pages
///
/// `P` is the opaque page type produced by the route table's builders, `R`
/// the type of values delivered to `push_and_await` callers.
///
/// All operations complete synchronously. The only deferred value is the
/// [`PendingResult`] returned by [`push_and_await`](Self::push_and_await).
///
/// # Example
///
/// ```
/// use route_stack::{RouteStack, RouteTable};
///
/// let table = RouteTable::new()
///     .route("^/home$", |_, _| "home".to_string())
///     .route("^/dialog$", |_, _| "dialog".to_string());
/// let mut stack: RouteStack<String, i32> = RouteStack::new(table);
///
/// stack.push_location("/home");
/// let answer = stack.push_and_await("/dialog");
/// assert_eq!(stack.locations(), ["/", "/home", "/dialog"]);
///
/// stack.remove_last_with_value(42).unwrap();
/// assert_eq!(pollster::block_on(answer), Ok(42));
/// assert_eq!(stack.locations(), ["/", "/home"]);
/// ```
pub struct RouteStack<P, R = ()> {
    table: RouteTable<P>,
    locations: Vec<Location>,
    pages: Vec<P>,
    pending: PendingResults<R>,
    observers: Observers<P>,
    /// One-shot: swallow the next `push_location`
    skip_next_push: bool,
    /// Withhold notifications until the outermost batch ends
    batching: bool,
    #[cfg(feature = "cache")]
    cache: Option<RouteCache>,
}

impl<P: NotFoundPage, R> RouteStack<P, R> {
    /// Stack seeded with `/`, default options
    pub fn new(table: RouteTable<P>) -> Self {
        Self::builder(table).build()
    }

    pub fn builder(table: RouteTable<P>) -> RouteStackBuilder<P, R> {
        RouteStackBuilder::new(table)
    }

    // ------------------------------------------------------------------
    // Push
    // ------------------------------------------------------------------

    /// Resolve a location, build its page and push it
    ///
    /// Notifies observers unless a batch is open. When the skip flag is set
    /// the call only clears it.
    pub fn push_location(&mut self, location: impl Into<Location>) {
        let from = self.top().cloned();
        if self.push_frame(location.into()) {
            self.notify(from, NavigationDirection::Forward);
        }
    }

    /// Push every location in order with a single notification at the end
    ///
    /// An empty sequence still notifies once.
    pub fn push_multiple<I>(&mut self, locations: I)
    where
        I: IntoIterator,
        I::Item: Into<Location>,
    {
        self.batched(Some(NavigationDirection::Forward), |stack| {
            for location in locations {
                stack.push_location(location);
            }
        });
    }

    /// Push a location and await the value supplied when it is popped
    ///
    /// The current top becomes the anchor: the result completes when a
    /// `*_with_value` pop exposes a location with the anchor's path.
    pub fn push_and_await(&mut self, location: impl Into<Location>) -> PendingResult<R> {
        let anchor = self.top().cloned();
        let pending = self.pending.register(anchor);
        self.push_location(location);
        pending
    }

    /// Replace the whole stack with one location
    ///
    /// Notifies like [`push_location`](Self::push_location): once, or not at
    /// all when the skip flag swallows the push.
    pub fn clear_and_push(&mut self, location: impl Into<Location>) {
        let from = self.top().cloned();
        self.truncate_frames(0);
        if self.push_frame(location.into()) {
            self.notify(from, NavigationDirection::Replace);
        }
    }

    /// Replace the whole stack with a sequence of locations
    ///
    /// Observers see one notification, also for an empty sequence.
    pub fn clear_and_push_multiple<I>(&mut self, locations: I)
    where
        I: IntoIterator,
        I::Item: Into<Location>,
    {
        self.batched(Some(NavigationDirection::Replace), |stack| {
            stack.truncate_frames(0);
            for location in locations {
                stack.push_location(location);
            }
        });
    }

    // ------------------------------------------------------------------
    // Remove
    // ------------------------------------------------------------------

    /// Remove the first frame whose location equals `location`
    pub fn remove_at(&mut self, location: impl Into<Location>) -> Result<()> {
        let location = location.into();
        let index = self.require_position(&location)?;
        let from = self.top().cloned();

        self.locations.remove(index);
        self.pages.remove(index);
        debug_log!("Removed '{}' at index {}", location, index);

        self.notify(from, NavigationDirection::Back);
        Ok(())
    }

    /// Remove the top frame
    ///
    /// Removing the only frame leaves the stack empty; see
    /// [`can_pop`](Self::can_pop) to keep a root.
    pub fn remove_last(&mut self) -> Result<()> {
        let from = self.top().cloned();
        if self.locations.pop().is_none() {
            warn_log!("remove_last on an empty stack");
            return Err(StackError::EmptyStack);
        }
        self.pages.pop();
        debug_log!("Popped {:?} (depth {})", from, self.len());

        self.notify(from, NavigationDirection::Back);
        Ok(())
    }

    /// Remove every frame above `location`, keeping `location` itself
    pub fn remove_until(&mut self, location: impl Into<Location>) -> Result<()> {
        let location = location.into();
        let index = self.require_position(&location)?;
        let from = self.top().cloned();

        self.truncate_frames(index + 1);

        self.notify(from, NavigationDirection::Back);
        Ok(())
    }

    /// Pop back to `pop_to`, then push `push`, as one change
    ///
    /// Observers see at most one notification, the push's; none when the
    /// skip flag swallows the push.
    pub fn remove_until_and_push(
        &mut self,
        pop_to: impl Into<Location>,
        push: impl Into<Location>,
    ) -> Result<()> {
        let pop_to = pop_to.into();
        let index = self.require_position(&pop_to)?;
        let from = self.top().cloned();

        self.truncate_frames(index + 1);
        if self.push_frame(push.into()) {
            self.notify(from, NavigationDirection::Replace);
        }
        Ok(())
    }

    /// Pop back to `location` and deliver `value` to the result anchored there
    ///
    /// Returns whether the value reached an awaiting caller.
    pub fn remove_until_with_value(
        &mut self,
        location: impl Into<Location>,
        value: R,
    ) -> Result<bool> {
        let location = location.into();
        let index = self.require_position(&location)?;
        let from = self.top().cloned();

        self.truncate_frames(index + 1);
        let delivered = self.pending.complete(&location, value);

        self.notify(from, NavigationDirection::Back);
        Ok(delivered)
    }

    /// Pop the top frame and deliver `value` to the result anchored at the
    /// frame below it
    ///
    /// With fewer than two frames no result can match; the pop still runs.
    pub fn remove_last_with_value(&mut self, value: R) -> Result<bool> {
        let delivered = match self.locations.len().checked_sub(2) {
            Some(index) => {
                let target = self.locations[index].clone();
                self.pending.complete(&target, value)
            }
            None => {
                trace_log!("Stack too shallow to deliver a result");
                false
            }
        };

        self.remove_last()?;
        Ok(delivered)
    }

    // ------------------------------------------------------------------
    // Batching
    // ------------------------------------------------------------------

    /// Run several operations with a single notification at the end
    ///
    /// Batches nest: an inner batch (or bulk operation) joins the outer
    /// one and only the outermost emits.
    ///
    /// ```
    /// use route_stack::{RouteStack, RouteTable};
    ///
    /// let mut stack: RouteStack<String> = RouteStack::new(RouteTable::new());
    /// let result = stack.batch(|stack| {
    ///     stack.push_location("/a");
    ///     stack.push_location("/b");
    ///     stack.remove_at("/a")
    /// });
    /// assert!(result.is_ok());
    /// assert_eq!(stack.locations(), ["/", "/b"]);
    /// ```
    pub fn batch<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.batched(None, f)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Append one frame; `false` if the skip flag swallowed it
    fn push_frame(&mut self, location: Location) -> bool {
        if self.skip_next_push {
            self.skip_next_push = false;
            debug_log!("Skipping push of '{}' (first push after seeding)", location);
            return false;
        }

        let page = self.build_page(&location);
        self.locations.push(location);
        self.pages.push(page);
        debug_log!("Pushed {:?} (depth {})", self.locations.last(), self.len());
        true
    }

    #[cfg(feature = "cache")]
    fn build_page(&mut self, location: &Location) -> P {
        let Some(cache) = self.cache.as_mut() else {
            return self.table.build(location);
        };

        let path = location.path();
        let resolved = match cache.get(path) {
            Some(Some(index)) => self.table.match_at(index, location),
            Some(None) => None,
            None => {
                let resolved = self.table.resolve(location);
                cache.insert(path, resolved.as_ref().map(|(_, m)| m.route_index));
                resolved
            }
        };

        match resolved {
            Some((entry, route_match)) => entry.build(location, &route_match),
            None => self.table.build_fallback(location),
        }
    }

    #[cfg(not(feature = "cache"))]
    fn build_page(&mut self, location: &Location) -> P {
        self.table.build(location)
    }
}

impl<P, R> RouteStack<P, R> {
    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Register a change listener
    ///
    /// Listeners run synchronously after each notified change and see the
    /// stack through a read-only [`StackView`].
    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&StackChangeEvent, &StackView<'_, P>) + Send + 'static,
    {
        self.observers.subscribe(listener)
    }

    /// Release a listener; `false` if it was not registered here
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // ------------------------------------------------------------------
    // Read-only access
    // ------------------------------------------------------------------

    pub fn view(&self) -> StackView<'_, P> {
        StackView::new(&self.locations, &self.pages)
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn pages(&self) -> &[P] {
        &self.pages
    }

    /// Frames from bottom to top
    pub fn frames(&self) -> impl DoubleEndedIterator<Item = (&Location, &P)> + '_ {
        self.locations.iter().zip(self.pages.iter())
    }

    pub fn top(&self) -> Option<&Location> {
        self.locations.last()
    }

    pub fn top_page(&self) -> Option<&P> {
        self.pages.last()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Whether a pop would leave at least one frame
    pub fn can_pop(&self) -> bool {
        self.locations.len() > 1
    }

    pub fn position(&self, location: &Location) -> Option<usize> {
        self.locations.iter().position(|l| l == location)
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.position(location).is_some()
    }

    /// Results still waiting for a value
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn await_policy(&self) -> AwaitPolicy {
        self.pending.policy()
    }

    pub fn is_batching(&self) -> bool {
        self.batching
    }

    /// Whether the next push will be swallowed
    pub fn skips_next_push(&self) -> bool {
        self.skip_next_push
    }

    pub fn route_table(&self) -> &RouteTable<P> {
        &self.table
    }

    /// Resolution cache statistics, `None` when the cache is disabled
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> Option<&CacheStats> {
        self.cache.as_ref().map(RouteCache::stats)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require_position(&self, location: &Location) -> Result<usize> {
        self.position(location).ok_or_else(|| {
            warn_log!("Location '{}' is not on the stack", location);
            StackError::not_found(location)
        })
    }

    fn truncate_frames(&mut self, len: usize) {
        if len < self.locations.len() {
            debug_log!("Truncating stack from {} to {}", self.locations.len(), len);
        }
        self.locations.truncate(len);
        self.pages.truncate(len);
    }

    /// Run `f` inside a batch; the outermost batch notifies once
    ///
    /// Without an explicit direction it is inferred from the depth change.
    fn batched<T>(
        &mut self,
        direction: Option<NavigationDirection>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let outer = self.batching;
        let from = self.top().cloned();
        let depth = self.len();

        self.batching = true;
        let output = f(self);

        if !outer {
            self.batching = false;
            let direction =
                direction.unwrap_or_else(|| NavigationDirection::infer(depth, self.len()));
            self.notify(from, direction);
        }
        output
    }

    fn notify(&mut self, from: Option<Location>, direction: NavigationDirection) {
        debug_assert_eq!(self.locations.len(), self.pages.len());
        if self.batching {
            trace_log!("Notification withheld while batching");
            return;
        }

        let event = StackChangeEvent {
            from,
            to: self.locations.last().cloned(),
            direction,
            depth: self.locations.len(),
        };
        let view = StackView::new(&self.locations, &self.pages);
        self.observers.emit(&event, &view);
    }
}

impl<P: fmt::Debug, R> fmt::Debug for RouteStack<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteStack")
            .field("frames", &self.view())
            .field("table", &self.table)
            .field("pending", &self.pending)
            .field("observers", &self.observers)
            .field("skip_next_push", &self.skip_next_push)
            .field("batching", &self.batching)
            .finish()
    }
}
