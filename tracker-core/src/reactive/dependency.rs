//! Dependency Implementation
//!
//! A Dependency represents one piece of reactive state. Computations that
//! read the state call [`Dependency::depend`]; whoever mutates it calls
//! [`Dependency::changed`], which invalidates every recorded computation.
//!
//! Membership is keyed by computation id and held through weak handles. A
//! computation leaves the set the moment it is invalidated, whatever the
//! reason, through a hook registered on the computation itself.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::computation::{Computation, WeakComputation};
use super::context::ReactiveContext;
use super::id::ComputationId;

type Dependents = RefCell<IndexMap<ComputationId, WeakComputation>>;

/// A set of computations interested in a piece of state.
///
/// Clones share the same dependent set.
#[derive(Clone, Default)]
pub struct Dependency {
    dependents: Rc<Dependents>,
}

impl Dependency {
    /// Create a dependency with no dependents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that the current computation depends on this dependency.
    ///
    /// Returns false if there is no current computation or if it was
    /// already a dependent.
    pub fn depend(&self) -> bool {
        match ReactiveContext::current() {
            Some(computation) => self.depend_for(&computation),
            None => false,
        }
    }

    /// Declare that `computation` depends on this dependency.
    ///
    /// Returns true if it is a new dependent.
    pub fn depend_for(&self, computation: &Computation) -> bool {
        let id = computation.id();
        {
            let mut dependents = self.dependents.borrow_mut();
            if dependents.contains_key(&id) {
                return false;
            }
            dependents.insert(id, computation.downgrade());
        }

        let dependents = Rc::downgrade(&self.dependents);
        computation.on_invalidate(move |_| {
            if let Some(dependents) = dependents.upgrade() {
                // Order-preserving: reruns follow dependency order.
                dependents.borrow_mut().shift_remove(&id);
            }
        });
        true
    }

    /// Invalidate every dependent computation, in the order they became
    /// dependents.
    pub fn changed(&self) {
        // Every dependent is about to leave the set, so take it whole. The
        // invalidation hooks then find nothing to remove, which keeps a wide
        // fan-out linear while preserving dependency order.
        let dependents = std::mem::take(&mut *self.dependents.borrow_mut());
        let computations: Vec<Computation> = dependents
            .values()
            .filter_map(WeakComputation::upgrade)
            .collect();

        for computation in computations {
            computation.invalidate();
        }
    }

    /// True if at least one computation would be invalidated by `changed()`.
    pub fn has_dependents(&self) -> bool {
        !self.dependents.borrow().is_empty()
    }

    /// Number of dependent computations.
    pub fn dependent_count(&self) -> usize {
        self.dependents.borrow().len()
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("dependents", &self.dependents.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}
