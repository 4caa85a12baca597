//! Subscriber types for the reactive system.
//!
//! A Subscriber is a change callback attached to one or more stateful cells.
//! Effects, conditional triggers and ad-hoc `on_change` listeners are all
//! subscribers underneath.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{ReactiveError, Result};

/// Unique identifier for a subscriber.
///
/// Removal from a cell is by identity: the same id subscribed to several
/// cells (one effect over a dependency list) is removed from each of them
/// by the effect's disposer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber#{}", self.0)
    }
}

/// Type-erased change callback as stored by a cell.
pub type Notify = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// Return types accepted from user callbacks.
///
/// Infallible callbacks return `()`; callbacks that can fail (or that call
/// `set()` themselves and want to forward its error) return
/// `Result<(), ReactiveError>`.
pub trait EffectOutput {
    fn into_result(self) -> Result<()>;
}

impl EffectOutput for () {
    fn into_result(self) -> Result<()> {
        Ok(())
    }
}

impl EffectOutput for Result<(), ReactiveError> {
    fn into_result(self) -> Result<()> {
        self
    }
}

/// Wrap a user callback into the erased form stored by cells.
pub(crate) fn notify_from<F, R>(callback: F) -> Notify
where
    F: Fn() -> R + Send + Sync + 'static,
    R: EffectOutput,
{
    Arc::new(move || callback().into_result())
}

/// A subscriber to reactive values: an id paired with its callback.
#[derive(Clone)]
pub struct Subscriber {
    id: SubscriberId,
    notify: Notify,
}

impl Subscriber {
    /// Create a new subscriber with the given notification callback.
    pub fn new<F, R>(notify: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: EffectOutput,
    {
        Self::from_parts(SubscriberId::new(), notify_from(notify))
    }

    pub(crate) fn from_parts(id: SubscriberId, notify: Notify) -> Self {
        Self { id, notify }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Notify the subscriber that one of its dependencies changed.
    pub fn notify(&self) -> Result<()> {
        (self.notify)()
    }

    pub(crate) fn notifier(&self) -> &Notify {
        &self.notify
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}
