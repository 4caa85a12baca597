//! Reactive properties.
//!
//! A [`Property`] is a cell packaged for use as a struct field: plain
//! `value()` / `set_value()` accessors for the owner, and `state()` for
//! naming the property in a dependency list.

use std::fmt;

use super::runtime::Runtime;
use super::stateful::{Setter, Stateful};
use crate::error::Result;

/// Read access to a property, for handing out without the setter.
pub trait ReadonlyProperty<T> {
    fn value(&self) -> T;
}

/// A struct field that is reactive and stateful.
///
/// ```rust
/// use reactivity_core::{deps, reactive::{Property, Runtime}};
///
/// struct Config {
///     title_enabled: Property<bool>,
/// }
///
/// let runtime = Runtime::new();
/// let config = Config { title_enabled: Property::new(&runtime, false) };
///
/// let title = config.title_enabled.clone();
/// runtime
///     .use_effect(
///         move || println!("title enabled: {}", title.value()),
///         deps![config.title_enabled.state()],
///     )
///     .unwrap();
///
/// config.title_enabled.set_value(true).unwrap();
/// ```
pub struct Property<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    state: Stateful<T>,
    setter: Setter<T>,
}

impl<T> Property<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn new(runtime: &Runtime, value: T) -> Self {
        let (state, setter) = runtime.use_state(value);
        Self { state, setter }
    }

    /// The underlying cell, for dependency lists and triggers.
    pub fn state(&self) -> Stateful<T> {
        self.state.clone()
    }

    pub fn value(&self) -> T {
        self.state.get()
    }

    /// Set the value, running effects that depend on this property.
    pub fn set_value(&self, value: T) -> Result<()> {
        self.setter.set(value)
    }

    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&T) -> T,
    {
        self.setter.update(f)
    }
}

impl<T> ReadonlyProperty<T> for Property<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn value(&self) -> T {
        Property::value(self)
    }
}

impl<T> ReadonlyProperty<T> for Stateful<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn value(&self) -> T {
        self.get()
    }
}

impl<T> Clone for Property<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<T> fmt::Debug for Property<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.value())
            .finish()
    }
}
