//! Conditional Triggers
//!
//! A trigger is a standing watch on one cell: every time the cell changes,
//! a list of conditions is checked against the new value and, if any holds,
//! an action runs with that value.
//!
//! ```rust
//! use reactivity_core::reactive::{it, when, Runtime};
//!
//! let runtime = Runtime::new();
//! let count = runtime.state(40);
//!
//! when(it(&count).meets_condition(|c| *c >= 50), |c| {
//!     println!("reached {c}");
//! });
//!
//! for _ in 0..20 {
//!     count.update(|c| c + 1).unwrap();
//! }
//! ```
//!
//! # Evaluation
//!
//! Conditions run in the order they were added and are combined with OR.
//! Every condition runs on every change, even after an earlier one matched.
//! The action runs at most once per change.
//!
//! A bound trigger has no handle and cannot be removed. It stops when the
//! watched cell is dropped.

use std::fmt;

use super::dependency::DependencyList;
use super::effect::Effect;
use super::stateful::Stateful;
use super::subscriber::EffectOutput;

type Condition<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A trigger under construction, bound to the watched cell.
pub struct WhenState<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    /// The thing being watched.
    stateful: Stateful<T>,

    /// Conditions in evaluation order.
    conditions: Vec<Condition<T>>,
}

impl<T> WhenState<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    /// Start a trigger on `stateful` with no conditions.
    pub fn new(stateful: &Stateful<T>) -> Self {
        Self {
            stateful: stateful.clone(),
            conditions: Vec::new(),
        }
    }

    /// Match when the cell's value equals `value`.
    pub fn equals(mut self, value: T) -> Self
    where
        T: PartialEq,
    {
        self.conditions.push(Box::new(move |current: &T| *current == value));
        self
    }

    /// Match when `condition` returns `true` for the cell's value.
    pub fn meets_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.conditions.push(Box::new(condition));
        self
    }

    /// The watched cell.
    pub fn stateful(&self) -> &Stateful<T> {
        &self.stateful
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// OR of all conditions for `value`, evaluating every one of them.
    pub fn evaluate(&self, value: &T) -> bool {
        any_condition(&self.conditions, value)
    }
}

impl<T> fmt::Debug for WhenState<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhenState")
            .field("stateful", &self.stateful.id())
            .field("conditions", &self.conditions.len())
            .finish()
    }
}

/// Start building a trigger on `stateful`.
pub fn it<T>(stateful: &Stateful<T>) -> WhenState<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    WhenState::new(stateful)
}

/// Bind `action` to run whenever the watched cell changes to a value that
/// meets any of the trigger's conditions.
///
/// The action receives the cell's value at the time of the change. An error
/// returned by the action propagates out of the `set()` that caused it.
pub fn when<T, F, R>(state: WhenState<T>, action: F)
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
    R: EffectOutput,
{
    let WhenState {
        stateful,
        conditions,
    } = state;

    let cell = stateful.id();
    let watched = stateful.downgrade_value();

    // The watch lives in the cell's own subscriber list, so it holds the
    // value weakly.
    Effect::attach(
        move || {
            let Some(value) = watched.upgrade() else {
                return Ok(());
            };
            let current = value.read().clone();
            if any_condition(&conditions, &current) {
                tracing::trace!(%cell, "trigger matched");
                action(current).into_result()
            } else {
                Ok(())
            }
        },
        DependencyList::single(&stateful),
    );
}

/// No short-circuit: every condition sees every change.
fn any_condition<T>(conditions: &[Condition<T>], value: &T) -> bool {
    let mut matched = false;
    for condition in conditions {
        matched |= condition(value);
    }
    matched
}
