//! Stateful Cell Implementation
//!
//! A [`Stateful`] is the fundamental reactive primitive. It holds a value and
//! an ordered list of change subscribers.
//!
//! # How Cells Work
//!
//! 1. Effects and triggers subscribe to the cells named in their dependency
//!    list. Nothing is tracked automatically: reading a cell never subscribes.
//!
//! 2. `set()` replaces the value, then calls every subscriber in insertion
//!    order, then every global hook of the owning runtime.
//!
//! 3. All of that happens before `set()` returns. There is no queue and no
//!    batching: N calls to `set()` mean N propagation passes.
//!
//! # Re-entrancy
//!
//! The subscriber list is snapshotted before the fan-out and no lock is held
//! while callbacks run, so a subscriber may set cells (including this one),
//! subscribe or unsubscribe. Callbacks added during a pass first run on the
//! next `set()`; callbacks removed during a pass are skipped right away. Nested `set()` calls recurse on the same stack,
//! bounded by the runtime's propagation limit.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use smallvec::SmallVec;

use super::hook::ChangeEvent;
use super::observable::{AnyValue, Observable};
use super::runtime::{Runtime, RuntimeId};
use super::subscriber::{notify_from, EffectOutput, Notify, Subscriber, SubscriberId};
use crate::error::Result;

/// Unique identifier of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

impl CellId {
    /// Generate a new unique cell ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for CellId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell#{}", self.0)
    }
}

/// Most cells have a handful of subscribers at most.
type SubscriberList = SmallVec<[Subscriber; 4]>;

/// A mutable value with change subscribers.
///
/// # Type Parameters
///
/// - `T`: The stored value. `Clone` for reads, `Debug` so global hooks can
///   describe it, `Send + Sync` so cells can be captured by callbacks.
///
/// # Example
///
/// ```rust
/// use reactivity_core::reactive::Stateful;
///
/// let count = Stateful::new(0);
/// count.on_change(|| println!("changed"));
///
/// count.set(5).unwrap(); // prints "changed"
/// assert_eq!(count.get(), 5);
/// ```
pub struct Stateful<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    /// Unique identifier for this cell.
    id: CellId,

    /// The current value.
    value: Arc<RwLock<T>>,

    /// Change callbacks, in invocation order. May hold the same id twice.
    subscribers: Arc<RwLock<SubscriberList>>,

    /// The runtime whose hooks and propagation limit apply to this cell.
    runtime: Runtime,
}

impl<T> Stateful<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    /// Create a cell bound to its own detached runtime.
    ///
    /// A detached cell has no global hooks, and any runtime may list it as a
    /// dependency. Use [`Runtime::state`] to create cells that share hooks
    /// and slots with others.
    pub fn new(value: T) -> Self {
        Self::with_runtime(&Runtime::detached(), value)
    }

    /// Create a cell owned by `runtime`.
    pub fn with_runtime(runtime: &Runtime, value: T) -> Self {
        Self {
            id: CellId::new(),
            value: Arc::new(RwLock::new(value)),
            subscribers: Arc::new(RwLock::new(SmallVec::new())),
            runtime: runtime.clone(),
        }
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> CellId {
        self.id
    }

    /// The runtime this cell reports to.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Read the value without cloning it.
    ///
    /// The cell is read-locked while `f` runs; `f` must not set this cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.value.read())
    }

    /// Replace the value and propagate the change.
    ///
    /// Subscribers run first, in insertion order, then the runtime's global
    /// hooks with the new value. The first failing callback aborts the rest
    /// of the pass and its error is returned; the value stays replaced.
    pub fn set(&self, value: T) -> Result<()> {
        let pass = self.runtime.propagation().enter(self.id)?;
        let announced = value.clone();

        *self.value.write() = value;

        self.notify_subscribers(pass.depth())?;

        let hooks = self.runtime.hooks();
        if !hooks.is_empty() {
            hooks.dispatch(&ChangeEvent {
                cell: self.id,
                value: &announced,
            })?;
        }

        Ok(())
    }

    /// Update the value using a function of the current one.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = f(&*self.value.read());
        self.set(new_value)
    }

    /// Register a notification callback under `subscriber_id`.
    ///
    /// Subscribing the same id twice means two invocations per change.
    pub fn subscribe<F, R>(&self, subscriber_id: SubscriberId, notify: F)
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: EffectOutput,
    {
        self.push_subscriber(Subscriber::from_parts(subscriber_id, notify_from(notify)));
    }

    /// Register a callback under a fresh id and return that id.
    pub fn on_change<F, R>(&self, notify: F) -> SubscriberId
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: EffectOutput,
    {
        let subscriber = Subscriber::new(notify);
        let id = subscriber.id();
        self.push_subscriber(subscriber);
        id
    }

    /// Remove the first callback registered under `subscriber_id`.
    ///
    /// Takes effect immediately: a callback removed by an earlier subscriber
    /// of a running pass is skipped in that pass. Returns `false` if there
    /// was none.
    pub fn unsubscribe(&self, subscriber_id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write();
        match subscribers.iter().position(|s| s.id() == subscriber_id) {
            Some(index) => {
                subscribers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Get the number of subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Non-owning handle to the value, for callbacks stored in this cell.
    pub(crate) fn downgrade_value(&self) -> Weak<RwLock<T>> {
        Arc::downgrade(&self.value)
    }

    fn push_subscriber(&self, subscriber: Subscriber) {
        self.subscribers.write().push(subscriber);
    }

    /// Notify all subscribers that the value has changed.
    fn notify_subscribers(&self, depth: usize) -> Result<()> {
        let notifiers: SmallVec<[Notify; 4]> = self
            .subscribers
            .read()
            .iter()
            .map(|s| s.notifier().clone())
            .collect();

        tracing::trace!(cell = %self.id, depth, subscribers = notifiers.len(), "propagating change");

        for notify in notifiers {
            // Unsubscribed by an earlier callback of this pass.
            if !self.is_subscribed(&notify) {
                continue;
            }
            notify()?;
        }
        Ok(())
    }

    fn is_subscribed(&self, notify: &Notify) -> bool {
        self.subscribers
            .read()
            .iter()
            .any(|s| Arc::ptr_eq(s.notifier(), notify))
    }
}

impl<T> Clone for Stateful<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            subscribers: Arc::clone(&self.subscribers),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T> fmt::Debug for Stateful<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stateful")
            .field("id", &self.id)
            .field("value", &*self.value.read())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl<T> fmt::Display for Stateful<T>
where
    T: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.value.read(), f)
    }
}

impl<T> Observable for Stateful<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn cell_id(&self) -> CellId {
        self.id
    }

    fn runtime_id(&self) -> Option<RuntimeId> {
        (!self.runtime.is_detached()).then(|| self.runtime.id())
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn subscribe_notify(&self, id: SubscriberId, notify: Notify) {
        self.push_subscriber(Subscriber::from_parts(id, notify));
    }

    fn unsubscribe(&self, id: SubscriberId) -> bool {
        Stateful::unsubscribe(self, id)
    }

    fn current_value(&self) -> Box<dyn AnyValue> {
        Box::new(self.get())
    }
}

/// Write half of a cell, as returned by [`Runtime::use_state`].
pub struct Setter<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    cell: Stateful<T>,
}

impl<T> Setter<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    pub(crate) fn new(cell: Stateful<T>) -> Self {
        Self { cell }
    }

    /// Same as [`Stateful::set`] on the paired cell.
    pub fn set(&self, value: T) -> Result<()> {
        self.cell.set(value)
    }

    /// Same as [`Stateful::update`] on the paired cell.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&T) -> T,
    {
        self.cell.update(f)
    }
}

impl<T> Clone for Setter<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> fmt::Debug for Setter<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter").field("cell", &self.cell.id).finish()
    }
}

/// Unwrap the current value of a cell.
pub fn value<T>(stateful: &Stateful<T>) -> T
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    stateful.get()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
