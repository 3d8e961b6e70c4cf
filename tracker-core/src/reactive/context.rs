//! Reactive Context
//!
//! The reactive context tracks which computation is currently running.
//! This enables automatic dependency tracking: when a dependency is read,
//! we can register the current computation as a dependent.
//!
//! # Implementation
//!
//! We use a thread-local stack. Running a computation body pushes that
//! computation; a nonreactive scope pushes an empty entry, which hides any
//! enclosing computation without forgetting that a body is still executing.
//! Both are popped by a guard, so the previous context is restored on every
//! exit path, including unwinding.

use std::cell::RefCell;

use super::Computation;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Option<Computation>>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the context when dropped.
#[must_use = "the context is exited as soon as the guard is dropped"]
pub struct ReactiveContext {
    depth: usize,
}

impl ReactiveContext {
    /// Enter a context in which `computation` is current.
    pub(crate) fn enter(computation: &Computation) -> Self {
        Self::push(Some(computation.clone()))
    }

    /// Enter a context with no current computation.
    pub fn nonreactive() -> Self {
        Self::push(None)
    }

    fn push(entry: Option<Computation>) -> Self {
        let depth = CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(entry);
            stack.len()
        });
        Self { depth }
    }

    /// Check if there is a current computation.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| matches!(stack.borrow().last(), Some(Some(_))))
    }

    /// Get the current computation, if any.
    pub fn current() -> Option<Computation> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned().flatten())
    }

    /// True while any computation body is executing on this thread, even
    /// when a nonreactive scope hides it.
    pub fn in_compute() -> bool {
        CONTEXT_STACK.with(|stack| stack.borrow().iter().any(Option::is_some))
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        let popped = CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            debug_assert_eq!(
                stack.len(),
                self.depth,
                "ReactiveContext dropped out of order"
            );
            stack.pop()
        });
        // The handle may be the last strong reference; release it outside the borrow.
        drop(popped);
    }
}

/// Run `f` with no current computation, returning its result.
pub fn nonreactive<R>(f: impl FnOnce() -> R) -> R {
    let _ctx = ReactiveContext::nonreactive();
    f()
}
