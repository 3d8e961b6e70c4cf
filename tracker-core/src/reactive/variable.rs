//! Variable Implementation
//!
//! A Variable is a value cell built on a [`Dependency`]. Reading it inside a
//! computation records the dependency; writing it invalidates every
//! computation that read it.

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use super::Dependency;

/// A reactive value of type `T`.
///
/// # Example
///
/// ```rust,ignore
/// let count = Variable::new(0);
///
/// let c = autorun({
///     let count = count.clone();
///     move |_| {
///         println!("count is {}", count.get());
///         Ok(())
///     }
/// })?;
///
/// count.set(5);
/// flush()?; // prints "count is 5"
/// ```
pub struct Variable<T> {
    value: Rc<RefCell<T>>,
    dependency: Dependency,
}

impl<T: Clone> Variable<T> {
    /// Create a new variable with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            dependency: Dependency::new(),
        }
    }

    /// Get the current value, recording a dependency of the current
    /// computation.
    pub fn get(&self) -> T {
        self.dependency.depend();
        self.get_untracked()
    }

    /// Get the current value without recording a dependency.
    pub fn get_untracked(&self) -> T {
        self.value.borrow().clone()
    }

    /// Replace the value and invalidate dependents.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.dependency.changed();
    }

    /// Update the value using a function of the current one.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = f(&self.value.borrow());
        self.set(new_value);
    }

    /// The dependency backing this variable.
    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }
}

impl<T> Clone for Variable<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            dependency: self.dependency.clone(),
        }
    }
}

impl<T: Clone + Debug> Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("value", &self.get_untracked())
            .field("dependent_count", &self.dependency.dependent_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
