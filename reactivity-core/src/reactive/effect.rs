//! Effect Implementation
//!
//! An Effect is a side-effecting callback that runs whenever any cell in its
//! dependency list changes.
//!
//! # How Effects Work
//!
//! 1. On registration, the callback is subscribed to every cell in the
//!    dependency list under one subscriber id. It does not run yet.
//!
//! 2. Each `set()` on any of those cells runs the callback once, before
//!    `set()` returns. An effect over N cells that are each set once runs N
//!    times; nothing is coalesced.
//!
//! 3. `dispose()` removes the subscription from every cell in the list.
//!
//! # Errors
//!
//! A callback returning `Err` stops the propagation pass it runs in, and the
//! error comes back out of the `set()` that started it.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::dependency::DependencyList;
use super::runtime::Runtime;
use super::subscriber::{EffectOutput, Notify, SubscriberId};
use crate::error::Result;

/// A registered effect and its disposer.
///
/// Dropping the handle does not unsubscribe: an effect lives until
/// [`Effect::dispose`] is called or its cells are dropped.
///
/// # Example
///
/// ```rust
/// use reactivity_core::{deps, reactive::Runtime};
///
/// let runtime = Runtime::new();
/// let count = runtime.state(0);
///
/// let shown = count.clone();
/// let effect = runtime
///     .use_effect(move || println!("count is {}", shown.get()), deps![count])
///     .unwrap();
///
/// count.set(5).unwrap(); // prints "count is 5"
/// effect.dispose();
/// count.set(6).unwrap(); // prints nothing
/// assert_eq!(effect.run_count(), 1);
/// ```
pub struct Effect {
    /// The subscriber ID shared by every subscription of this effect.
    subscriber_id: SubscriberId,

    /// The cells this effect is subscribed to.
    dependencies: DependencyList,

    /// Whether the effect has been disposed.
    disposed: Arc<AtomicBool>,

    /// Number of times the effect has run.
    run_count: Arc<AtomicUsize>,
}

impl Effect {
    /// Validate `dependencies` against `runtime` (if enabled) and subscribe.
    pub(crate) fn register<F, R>(
        runtime: &Runtime,
        run: F,
        dependencies: DependencyList,
    ) -> Result<Self>
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: EffectOutput,
    {
        if runtime.config().validate_dependencies {
            dependencies.validate(runtime.id())?;
        }
        Ok(Self::attach(run, dependencies))
    }

    /// Subscribe without validation.
    pub(crate) fn attach<F, R>(run: F, dependencies: DependencyList) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: EffectOutput,
    {
        let subscriber_id = SubscriberId::new();
        let disposed = Arc::new(AtomicBool::new(false));
        let run_count = Arc::new(AtomicUsize::new(0));

        let notify: Notify = {
            let disposed = Arc::clone(&disposed);
            let run_count = Arc::clone(&run_count);
            Arc::new(move || {
                // Disposed mid-pass: the snapshot may still hold us.
                if disposed.load(Ordering::SeqCst) {
                    return Ok(());
                }
                run_count.fetch_add(1, Ordering::SeqCst);
                run().into_result()
            })
        };

        for dependency in dependencies.iter() {
            dependency.subscribe_notify(subscriber_id, Arc::clone(&notify));
        }

        tracing::debug!(
            subscriber = %subscriber_id,
            dependencies = dependencies.len(),
            "effect registered"
        );

        Self {
            subscriber_id,
            dependencies,
            disposed,
            run_count,
        }
    }

    /// Get the subscriber ID for this effect.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    /// Unsubscribe from every dependency.
    ///
    /// After disposal, the effect will not run again. Calling this more
    /// than once is a no-op.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        for dependency in self.dependencies.iter() {
            dependency.unsubscribe(self.subscriber_id);
        }
        tracing::debug!(subscriber = %self.subscriber_id, "effect disposed");
    }

    /// The disposer as a standalone callback.
    pub fn disposer(&self) -> impl Fn() + Send + Sync + 'static {
        let effect = self.clone();
        move || effect.dispose()
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.run_count.load(Ordering::SeqCst)
    }

    /// Get the number of dependencies.
    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            subscriber_id: self.subscriber_id,
            dependencies: self.dependencies.clone(),
            disposed: Arc::clone(&self.disposed),
            run_count: Arc::clone(&self.run_count),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("subscriber_id", &self.subscriber_id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
