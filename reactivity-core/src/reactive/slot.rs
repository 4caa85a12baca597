//! Named Slots
//!
//! A slot is mutable storage that lives outside the reactive graph. Reading
//! or writing a [`Ref`] never runs an effect and never counts as a
//! dependency, which makes slots the place for values that must survive
//! repeated effect runs (counters, previous values, cached handles).
//!
//! # Identity
//!
//! Every slot is keyed by a [`SlotKey`]. The usual key is the call site of
//! `Runtime::use_ref` (captured with `#[track_caller]`), so the same line of
//! code resolves to the same slot no matter how often it runs. Explicit keys
//! are available for call sites shared between logically different slots.
//!
//! The first call for a key wins: later calls return the stored slot and
//! drop the initial value they were given.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use rand::Rng;

use crate::error::{ReactiveError, Result};

/// Identity of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotKey {
    /// Derived from a source location.
    CallSite {
        file: &'static str,
        line: u32,
        column: u32,
    },
    /// Chosen by the caller.
    Named(Cow<'static, str>),
}

impl SlotKey {
    /// Key for the location that called the current function.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }

    /// Key with an explicit name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Named(name.into())
    }
}

impl From<&'static Location<'static>> for SlotKey {
    fn from(location: &'static Location<'static>) -> Self {
        Self::CallSite {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl From<&'static str> for SlotKey {
    fn from(name: &'static str) -> Self {
        Self::named(name)
    }
}

impl From<String> for SlotKey {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CallSite { file, line, column } => write!(f, "{file}:{line}:{column}"),
            Self::Named(name) => write!(f, "'{name}'"),
        }
    }
}

/// Mutable storage exempt from the reactive system.
///
/// Clones share the same slot.
pub struct Ref<T> {
    key: SlotKey,
    cell: Arc<RwLock<T>>,
}

impl<T> Ref<T>
where
    T: Send + Sync + 'static,
{
    /// The key this slot is stored under.
    pub fn key(&self) -> &SlotKey {
        &self.key
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.read().clone()
    }

    pub fn set(&self, value: T) {
        *self.cell.write() = value;
    }

    /// Mutate the value in place.
    ///
    /// The slot is write-locked while `f` runs; `f` must not access this
    /// slot through any handle.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.cell.write())
    }

    /// Read the value without cloning it.
    ///
    /// The slot is read-locked while `f` runs; `f` must not write to it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.cell.read())
    }

    /// Check whether two handles point at the same slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("key", &self.key)
            .field("value", &*self.cell.read())
            .finish()
    }
}

/// Range for ids handed out by `Runtime::use_id`. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdOptions {
    pub minimum: u64,
    pub maximum: u64,
}

impl IdOptions {
    pub fn new(minimum: u64, maximum: u64) -> Self {
        Self { minimum, maximum }
    }
}

impl Default for IdOptions {
    fn default() -> Self {
        Self {
            minimum: 0,
            maximum: u64::MAX,
        }
    }
}

struct SlotEntry {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// Keyed slot storage owned by a runtime. Entries are never evicted.
#[derive(Default)]
pub struct SlotStore {
    slots: DashMap<SlotKey, SlotEntry>,
    ids: DashMap<SlotKey, u64>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the slot stored under `key`, creating it from `initial` if absent.
    ///
    /// Fails if the slot exists with a different value type.
    pub fn get_or_create<T>(&self, key: SlotKey, initial: T) -> Result<Ref<T>>
    where
        T: Send + Sync + 'static,
    {
        let (stored, found) = {
            let entry = self.slots.entry(key.clone()).or_insert_with(|| {
                tracing::debug!(%key, "slot created");
                SlotEntry {
                    value: Arc::new(RwLock::new(initial)),
                    type_name: std::any::type_name::<T>(),
                }
            });
            (Arc::clone(&entry.value), entry.type_name)
        };

        match stored.downcast::<RwLock<T>>() {
            Ok(cell) => Ok(Ref { key, cell }),
            Err(_) => Err(ReactiveError::SlotTypeMismatch {
                key,
                expected: std::any::type_name::<T>(),
                found,
            }),
        }
    }

    /// Stable random id for `key`, drawn once from `options`.
    pub fn id_for(&self, key: SlotKey, options: IdOptions) -> u64 {
        *self.ids.entry(key).or_insert_with(|| {
            let (low, high) = if options.minimum <= options.maximum {
                (options.minimum, options.maximum)
            } else {
                (options.maximum, options.minimum)
            };
            rand::thread_rng().gen_range(low..=high)
        })
    }

    /// Number of slots created so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.slots.contains_key(key)
    }
}

impl fmt::Debug for SlotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotStore")
            .field("slots", &self.slots.len())
            .field("ids", &self.ids.len())
            .finish()
    }
}
