//! Dependency lists.
//!
//! An effect does not discover its dependencies by running; it is told them
//! up front. A [`DependencyList`] is that declaration: a fixed, ordered set of
//! cells the effect subscribes to. Lists are usually built with the
//! [`deps!`](crate::deps) macro.

use std::fmt;
use std::sync::Arc;

use super::observable::Observable;
use super::runtime::RuntimeId;
use crate::error::{ReactiveError, Result};

/// Ordered, immutable list of cells an effect depends on.
#[derive(Clone, Default)]
pub struct DependencyList {
    dependencies: Vec<Arc<dyn Observable>>,
}

impl DependencyList {
    /// Build a list from type-erased cells.
    pub fn new(dependencies: Vec<Arc<dyn Observable>>) -> Self {
        Self { dependencies }
    }

    /// A list with no dependencies. An effect over it never runs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A list holding a single cell.
    pub fn single<O>(dependency: &O) -> Self
    where
        O: Observable + Clone + 'static,
    {
        let dependency: Arc<dyn Observable> = Arc::new(dependency.clone());
        Self::new(vec![dependency])
    }

    /// The total number of dependencies in this list.
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Observable> {
        self.dependencies.get(index).map(|dep| dep.as_ref())
    }

    /// The dependencies in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Observable> + '_ {
        self.dependencies.iter().map(|dep| dep.as_ref())
    }

    /// Check that every dependency reports to `runtime` or is standalone.
    ///
    /// A cell owned by another runtime would run the effect under that
    /// runtime's hooks and propagation limit, so it is rejected with the
    /// offending index and type.
    pub fn validate(&self, runtime: RuntimeId) -> Result<()> {
        for (index, dependency) in self.iter().enumerate() {
            if dependency.runtime_id().is_some_and(|owner| owner != runtime) {
                return Err(ReactiveError::InvalidDependency {
                    index,
                    type_name: dependency.type_name(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<Arc<dyn Observable>> for DependencyList {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Observable>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Debug for DependencyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|dep| dep.cell_id()))
            .finish()
    }
}
