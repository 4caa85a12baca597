//! Reactive Runtime
//!
//! The runtime is the context object that cells, effects and slots belong
//! to. It owns everything that is not tied to a single cell:
//!
//! - the global hook list, run after every mutation of any of its cells
//! - the named slot store behind `use_ref` and `use_id`
//! - the propagation depth guard
//! - the configuration
//!
//! # Why a Context Object
//!
//! There is no process-wide singleton. Each `Runtime` is independent, so
//! two runtimes never see each other's hooks or slots, and tests can create
//! as many as they like. A `Runtime` is a cheap handle; clones share state.
//!
//! # Thread Safety
//!
//! The runtime and its cells are `Send + Sync`, but propagation is designed
//! for one thread at a time: the depth guard counts nested `set()` calls of
//! the whole runtime, not per thread.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::context::PropagationContext;
use super::dependency::DependencyList;
use super::effect::Effect;
use super::hook::{verbose_debug_hook, ChangeEvent, GlobalHooks, HookId};
use super::slot::{IdOptions, Ref, SlotKey, SlotStore};
use super::stateful::{Setter, Stateful};
use super::subscriber::EffectOutput;
use crate::config::RuntimeConfig;
use crate::error::Result;

/// Unique identifier of a runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeId(u64);

impl RuntimeId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

struct RuntimeInner {
    id: RuntimeId,
    config: RuntimeConfig,
    hooks: GlobalHooks,
    slots: SlotStore,
    propagation: PropagationContext,
    /// Backs a standalone cell; any runtime may list such cells.
    detached: bool,
    /// Id of the installed verbose debug hook, if enabled.
    debug_hook: Mutex<Option<HookId>>,
}

/// A reactive context.
///
/// # Example
///
/// ```rust
/// use reactivity_core::{deps, reactive::Runtime};
///
/// let runtime = Runtime::new();
/// let (count, set_count) = runtime.use_state(0);
///
/// let seen = count.clone();
/// runtime
///     .use_effect(move || println!("count: {}", seen.get()), deps![count])
///     .unwrap();
///
/// set_count.set(1).unwrap(); // prints "count: 1"
/// ```
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

impl Runtime {
    /// Create a runtime with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with the given configuration.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::build(config, false)
    }

    /// The private runtime behind [`Stateful::new`].
    pub(crate) fn detached() -> Self {
        Self::build(RuntimeConfig::default(), true)
    }

    fn build(config: RuntimeConfig, detached: bool) -> Self {
        let runtime = Self {
            inner: Arc::new(RuntimeInner {
                id: RuntimeId::new(),
                propagation: PropagationContext::new(config.max_propagation_depth),
                hooks: GlobalHooks::new(),
                slots: SlotStore::new(),
                debug_hook: Mutex::new(None),
                detached,
                config,
            }),
        };

        if runtime.inner.config.verbose_debug {
            runtime.enable_verbose_debug_output(true);
        }

        runtime
    }

    pub fn id(&self) -> RuntimeId {
        self.inner.id
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Whether this runtime only backs a standalone cell.
    pub fn is_detached(&self) -> bool {
        self.inner.detached
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    /// Create a cell owned by this runtime.
    pub fn state<T>(&self, initial: T) -> Stateful<T>
    where
        T: Clone + fmt::Debug + Send + Sync + 'static,
    {
        Stateful::with_runtime(self, initial)
    }

    /// Create a cell and return it with its setter.
    pub fn use_state<T>(&self, initial: T) -> (Stateful<T>, Setter<T>)
    where
        T: Clone + fmt::Debug + Send + Sync + 'static,
    {
        let state = self.state(initial);
        let setter = Setter::new(state.clone());
        (state, setter)
    }

    // ------------------------------------------------------------------------
    // Effects
    // ------------------------------------------------------------------------

    /// Run `effect` whenever any cell in `dependencies` changes.
    ///
    /// The effect does not run now. With dependency validation enabled, a
    /// cell owned by another runtime (not a standalone one) fails registration with
    /// [`ReactiveError::InvalidDependency`](crate::error::ReactiveError::InvalidDependency).
    pub fn use_effect<F, R>(&self, effect: F, dependencies: DependencyList) -> Result<Effect>
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: EffectOutput,
    {
        Effect::register(self, effect, dependencies)
    }

    // ------------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------------

    /// Storage outside the reactive system, keyed by the caller's location.
    ///
    /// Every call from the same line and column returns the same slot; the
    /// `initial` value is only used the first time.
    #[track_caller]
    pub fn use_ref<T>(&self, initial: T) -> Result<Ref<T>>
    where
        T: Send + Sync + 'static,
    {
        self.inner.slots.get_or_create(SlotKey::caller(), initial)
    }

    /// Like [`use_ref`](Self::use_ref), with an explicit key.
    pub fn use_ref_keyed<T>(&self, key: impl Into<SlotKey>, initial: T) -> Result<Ref<T>>
    where
        T: Send + Sync + 'static,
    {
        self.inner.slots.get_or_create(key.into(), initial)
    }

    /// A random id, fixed per call site for the lifetime of the runtime.
    #[track_caller]
    pub fn use_id(&self, options: IdOptions) -> u64 {
        self.inner.slots.id_for(SlotKey::caller(), options)
    }

    /// Number of named slots created so far.
    pub fn slot_count(&self) -> usize {
        self.inner.slots.len()
    }

    // ------------------------------------------------------------------------
    // Global hooks
    // ------------------------------------------------------------------------

    /// Install a hook that runs after every `set()` of every cell of this
    /// runtime.
    pub fn install_global_hook<F, R>(&self, hook: F) -> HookId
    where
        F: Fn(&ChangeEvent<'_>) -> R + Send + Sync + 'static,
        R: EffectOutput,
    {
        self.inner.hooks.install(hook)
    }

    /// Remove a hook. Returns `false` if it was not installed.
    pub fn remove_global_hook(&self, id: HookId) -> bool {
        self.inner.hooks.remove(id)
    }

    pub fn has_global_hooks(&self) -> bool {
        !self.inner.hooks.is_empty()
    }

    pub fn global_hook_count(&self) -> usize {
        self.inner.hooks.len()
    }

    /// Log every change through `tracing` (target `reactivity::debug`).
    ///
    /// Enabling twice installs the hook once.
    pub fn enable_verbose_debug_output(&self, enabled: bool) {
        let mut debug_hook = self.inner.debug_hook.lock();
        match (enabled, *debug_hook) {
            (true, None) => {
                tracing::info!(runtime = ?self.id(), "verbose debug output enabled");
                *debug_hook = Some(self.inner.hooks.install(verbose_debug_hook));
            }
            (false, Some(id)) => {
                self.inner.hooks.remove(id);
                *debug_hook = None;
            }
            _ => {}
        }
    }

    pub fn is_verbose_debug_output_enabled(&self) -> bool {
        self.inner.debug_hook.lock().is_some()
    }

    // ------------------------------------------------------------------------
    // Internals used by cells
    // ------------------------------------------------------------------------

    pub(crate) fn hooks(&self) -> &GlobalHooks {
        &self.inner.hooks
    }

    pub(crate) fn propagation(&self) -> &PropagationContext {
        &self.inner.propagation
    }

    /// Current nesting depth of `set()` calls.
    pub fn propagation_depth(&self) -> usize {
        self.inner.propagation.depth()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("id", &self.inner.id)
            .field("detached", &self.inner.detached)
            .field("config", &self.inner.config)
            .field("hooks", &self.inner.hooks)
            .field("slots", &self.inner.slots)
            .finish()
    }
}
