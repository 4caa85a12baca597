//! Type-erased view of a stateful cell.
//!
//! Dependency lists and global hooks have to hold cells of many different
//! value types side by side. [`Observable`] is the object-safe capability set
//! they store instead of the concrete `Stateful<T>`, and [`AnyValue`] is the
//! erased form of a cell's value handed to hooks.

use std::any::Any;
use std::fmt::Debug;

use super::runtime::RuntimeId;
use super::stateful::CellId;
use super::subscriber::{Notify, SubscriberId};

/// A value that can be passed around without knowing its concrete type.
pub trait AnyValue: Any + Debug + Send + Sync {
    /// Upcast for downcasting back to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Name of the concrete type.
    fn type_name(&self) -> &'static str;
}

// `Clone` keeps `Box<dyn AnyValue>` itself out of the blanket impl, so method
// calls on a boxed value reach the inner value.
impl<T> AnyValue for T
where
    T: Any + Clone + Debug + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl dyn AnyValue {
    /// Downcast to a concrete value type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Capabilities every dependency must expose.
pub trait Observable: Send + Sync {
    /// Identity of the underlying cell.
    fn cell_id(&self) -> CellId;

    /// Identity of the runtime the cell reports to, or `None` for a
    /// standalone cell.
    fn runtime_id(&self) -> Option<RuntimeId>;

    /// Type name of the cell, used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// Append a change callback.
    fn subscribe_notify(&self, id: SubscriberId, notify: Notify);

    /// Remove the first callback registered under `id`.
    fn unsubscribe(&self, id: SubscriberId) -> bool;

    /// Snapshot of the current value.
    fn current_value(&self) -> Box<dyn AnyValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_value_downcasts_to_concrete_type() {
        let value: Box<dyn AnyValue> = Box::new(42_i32);

        assert_eq!(value.downcast_ref::<i32>(), Some(&42));
        assert!(value.downcast_ref::<String>().is_none());
        assert_eq!(value.type_name(), "i32");
    }

    #[test]
    fn any_value_debug_formats_inner() {
        let value: Box<dyn AnyValue> = Box::new(String::from("hello"));
        assert_eq!(format!("{value:?}"), "\"hello\"");
    }
}
