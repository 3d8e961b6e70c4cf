//! Reactive Primitives
//!
//! This module implements the two entities of the tracker: computations and
//! dependencies.
//!
//! # Concepts
//!
//! ## Computations
//!
//! A Computation runs a body and reruns it whenever something the body read
//! has changed. Computations created while another one is running become its
//! children and are stopped when the parent is invalidated.
//!
//! ## Dependencies
//!
//! A Dependency stands for one piece of mutable state. Reading the state
//! inside a body calls `depend()`; mutating it calls `changed()`, which
//! invalidates every dependent computation.
//!
//! ## Variables
//!
//! A Variable is a value cell that wires `depend()` and `changed()` into
//! its getter and setter.
//!
//! # Implementation Notes
//!
//! The current computation lives in a thread-local context stack. Reruns are
//! not performed by `changed()` itself; invalidated computations are queued
//! on the flush scheduler, which drains them in FIFO order.

mod computation;
mod context;
mod dependency;
mod id;
mod variable;

pub use computation::Computation;
pub use context::{nonreactive, ReactiveContext};
pub use dependency::Dependency;
pub use id::ComputationId;
pub use variable::Variable;

pub(crate) use computation::{Body, ErrorHandler};
