//! Global hooks.
//!
//! A global hook observes every mutation of every cell in a runtime,
//! independent of any subscription. Hooks run after the changed cell's own
//! subscribers, in installation order.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::observable::AnyValue;
use super::stateful::CellId;
use super::subscriber::EffectOutput;
use crate::error::Result;

/// Identity of an installed hook, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

impl HookId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// What a hook sees for one mutation.
#[derive(Debug, Clone, Copy)]
pub struct ChangeEvent<'a> {
    /// The cell that was set.
    pub cell: CellId,
    /// The value passed to `set()`.
    pub value: &'a dyn AnyValue,
}

impl ChangeEvent<'_> {
    /// Downcast the new value.
    pub fn value_as<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.value.type_name()
    }
}

pub(crate) type HookFn = Arc<dyn Fn(&ChangeEvent<'_>) -> Result<()> + Send + Sync>;

/// Ordered registry of global hooks.
#[derive(Default)]
pub struct GlobalHooks {
    hooks: RwLock<IndexMap<HookId, HookFn>>,
}

impl GlobalHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook and return its id.
    pub fn install<F, R>(&self, hook: F) -> HookId
    where
        F: Fn(&ChangeEvent<'_>) -> R + Send + Sync + 'static,
        R: EffectOutput,
    {
        let id = HookId::new();
        let hook: HookFn = Arc::new(move |event: &ChangeEvent<'_>| hook(event).into_result());
        self.hooks.write().insert(id, hook);
        tracing::debug!(?id, "global hook installed");
        id
    }

    /// Remove a hook, keeping the order of the others.
    ///
    /// Returns `false` if no hook with that id was installed.
    pub fn remove(&self, id: HookId) -> bool {
        let removed = self.hooks.write().shift_remove(&id).is_some();
        if removed {
            tracing::debug!(?id, "global hook removed");
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    /// Invoke every hook with the event.
    ///
    /// The list is snapshotted first so hooks may install or remove hooks
    /// (or set cells) while running. The first error stops the pass.
    pub fn dispatch(&self, event: &ChangeEvent<'_>) -> Result<()> {
        let hooks: Vec<HookFn> = self.hooks.read().values().cloned().collect();
        for hook in hooks {
            hook(event)?;
        }
        Ok(())
    }
}

impl fmt::Debug for GlobalHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalHooks")
            .field("count", &self.len())
            .finish()
    }
}

/// The hook behind `enable_verbose_debug_output`.
pub(crate) fn verbose_debug_hook(event: &ChangeEvent<'_>) {
    tracing::info!(
        target: "reactivity::debug",
        cell = %event.cell,
        value = ?event.value,
        ty = event.type_name(),
        "change"
    );
}
