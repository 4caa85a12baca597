//! Reactivity Core
//!
//! A small synchronous reactive-state engine:
//!
//! - Stateful cells that notify subscribers when set
//! - Effects over an explicit list of dependencies, with a disposer
//! - Conditional triggers (`when(it(cell).equals(..), action)`)
//! - Per-call-site storage slots outside the reactive system
//! - Global hooks that observe every mutation
//!
//! Every mutation is propagated to completion before `set()` returns. There
//! is no scheduler, no batching and no async.
//!
//! # Architecture
//!
//! - `reactive`: cells, effects, triggers, slots, hooks and the [`Runtime`]
//!   context that ties them together
//! - `config`: runtime configuration
//! - `error`: the crate's error type
//!
//! # Example
//!
//! ```rust
//! use reactivity_core::prelude::*;
//!
//! let runtime = Runtime::new();
//! let (count, set_count) = runtime.use_state(0);
//!
//! let shown = count.clone();
//! let effect = runtime
//!     .use_effect(move || println!("count: {}", shown.get()), deps![count])
//!     .unwrap();
//!
//! when(it(&count).equals(3), |c| println!("hit {c}"));
//!
//! for i in 1..=5 {
//!     set_count.set(i).unwrap();
//! }
//!
//! effect.dispose();
//! assert_eq!(effect.run_count(), 5);
//! ```
//!
//! [`Runtime`]: reactive::Runtime

pub mod config;
pub mod error;
pub mod reactive;

pub use error::{ReactiveError, Result};

/// Build a [`DependencyList`](reactive::DependencyList) from cells.
///
/// Each argument is cloned (cells are cheap handles) and type-erased, so
/// cells of different value types can be listed together.
///
/// ```rust
/// use reactivity_core::{deps, reactive::Runtime};
///
/// let runtime = Runtime::new();
/// let name = runtime.state(String::from("ada"));
/// let age = runtime.state(36);
///
/// assert_eq!(deps![name, age].len(), 2);
/// assert!(deps![].is_empty());
/// ```
#[macro_export]
macro_rules! deps {
    () => {
        $crate::reactive::DependencyList::empty()
    };
    ($($dep:expr),+ $(,)?) => {
        $crate::reactive::DependencyList::new(::std::vec![
            $(
                ::std::sync::Arc::new(::std::clone::Clone::clone(&$dep))
                    as ::std::sync::Arc<dyn $crate::reactive::Observable>
            ),+
        ])
    };
}

/// The types most programs need.
pub mod prelude {
    pub use crate::config::RuntimeConfig;
    pub use crate::deps;
    pub use crate::error::{ReactiveError, Result};
    pub use crate::reactive::{
        it, value, when, DependencyList, Effect, IdOptions, Property, ReadonlyProperty, Ref,
        Runtime, Setter, Stateful,
    };
}
