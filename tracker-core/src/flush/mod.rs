//! Flush Scheduling
//!
//! This module turns invalidations into reruns.
//!
//! # Overview
//!
//! Invalidated computations and after-flush callbacks are queued on a
//! per-thread scheduler. A flush drains both queues in a fixed order:
//! pending computations first, then one deferred callback, then pending
//! computations again, until nothing is left.
//!
//! Flushes happen in two ways:
//!
//! - Explicitly, through [`flush`](crate::tracker::flush). The call blocks
//!   until both queues are empty.
//! - On a later tick of the host event loop. Queuing work asks the installed
//!   [`FlushHost`] for a tick; these passes yield back to the host after a
//!   bounded number of recomputes so a runaway computation cannot starve it.

mod host;
pub(crate) mod scheduler;

pub use host::{FlushHost, ManualHost, TokioHost};
