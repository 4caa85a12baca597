//! Reactive Primitives
//!
//! This module implements the reactive system: stateful cells, effects over
//! declared dependencies, conditional triggers, named slots and global hooks.
//!
//! # Concepts
//!
//! ## Stateful Cells
//!
//! A [`Stateful`] is a container for mutable state. Setting it calls every
//! subscriber, synchronously and in subscription order. Reading it never
//! subscribes anything.
//!
//! ## Effects
//!
//! An [`Effect`] is a callback subscribed to an explicit [`DependencyList`].
//! It runs once for every `set()` on any listed cell, and stops for good when
//! disposed.
//!
//! ## Triggers
//!
//! [`when`] + [`it`] bind an action to a cell that runs only when the new
//! value equals a given value or meets a predicate.
//!
//! ## Slots and Hooks
//!
//! [`Ref`] slots are per-call-site storage outside the reactive system.
//! Global hooks observe every mutation of every cell in a [`Runtime`].
//!
//! # Implementation Notes
//!
//! There is no scheduler, no batching and no automatic dependency tracking.
//! A `set()` finishes its whole propagation pass, nested passes included,
//! before it returns.

mod context;
mod dependency;
mod effect;
mod hook;
mod observable;
mod property;
mod runtime;
mod slot;
mod stateful;
mod subscriber;
mod when;

pub use context::{PropagationContext, PropagationGuard};
pub use dependency::DependencyList;
pub use effect::Effect;
pub use hook::{ChangeEvent, GlobalHooks, HookId};
pub use observable::{AnyValue, Observable};
pub use property::{Property, ReadonlyProperty};
pub use runtime::{Runtime, RuntimeId};
pub use slot::{IdOptions, Ref, SlotKey, SlotStore};
pub use stateful::{value, CellId, Setter, Stateful};
pub use subscriber::{EffectOutput, Notify, Subscriber, SubscriberId};
pub use when::{it, when, WhenState};
