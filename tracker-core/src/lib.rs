//! Tracker Core
//!
//! This crate provides a fine-grained reactive dependency tracker.
//! It implements:
//!
//! - Computations: bodies that rerun when what they read changes
//! - Dependencies: sets of computations interested in a piece of state
//! - A flush scheduler that drains invalidated computations and deferred
//!   callbacks in a well-defined order
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Computations, dependencies and the current-computation context
//! - `flush`: The per-thread scheduler and host event loop integration
//! - `tracker`: Caller-facing entry points
//!
//! Everything is single-threaded. Scheduler state lives in a thread local,
//! and handles are `!Send`.
//!
//! # Example
//!
//! ```rust,ignore
//! use tracker_core::reactive::Variable;
//! use tracker_core::tracker::{autorun, flush};
//!
//! let count = Variable::new(0);
//!
//! let c = autorun({
//!     let count = count.clone();
//!     move |_| {
//!         println!("Count: {}", count.get());
//!         Ok(())
//!     }
//! })?;
//!
//! count.set(5);
//! flush()?;
//! // Prints: "Count: 5"
//!
//! c.stop();
//! ```

pub mod config;
pub mod error;
pub mod flush;
pub mod reactive;
pub mod tracker;

pub use config::TrackerConfig;
pub use error::{BodyError, BodyResult, TrackerError};
pub use reactive::{Computation, ComputationId, Dependency, Variable};
