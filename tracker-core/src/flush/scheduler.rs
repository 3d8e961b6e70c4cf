//! Flush Scheduler
//!
//! The scheduler owns the queues that connect invalidation to recompute:
//! the pending computations and the after-flush callbacks. A flush drains
//! both until they are empty.
//!
//! # Algorithm
//!
//! 1. While computations are pending, pop the head and recompute it. If it
//!    is still invalidated afterwards (it invalidated itself, or its error
//!    handler left it stale), push it to the tail.
//! 2. When nothing is pending, run exactly one after-flush callback, then
//!    go back to step 1. A callback never runs while a computation is
//!    pending, even one invalidated by an earlier callback.
//!
//! Host-driven passes yield after `yield_after` recomputes and ask the host
//! for another pass. Explicit flushes never yield.
//!
//! # Errors
//!
//! A blocking flush, or any flush with throw-first-error, remembers the first
//! unhandled recompute error, drains the backlog, and returns the remembered
//! error; later errors are logged. A host pass without throw-first-error
//! aborts at the first unhandled error. An after-flush failure always aborts
//! the pass. Whatever happens, the flush flags are reset and leftover work is
//! rescheduled.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use super::host::{FlushHost, ManualHost};
use crate::config::TrackerConfig;
use crate::error::{BodyResult, TrackerError};
use crate::reactive::{nonreactive, Computation, ComputationId, ReactiveContext};

pub(crate) type AfterFlushCallback = Box<dyn FnOnce() -> BodyResult>;

/// Per-thread scheduler state.
struct Scheduler {
    /// Invalidated computations waiting for a recompute, FIFO.
    pending: VecDeque<Computation>,

    /// Deferred callbacks, FIFO.
    after_flush: VecDeque<AfterFlushCallback>,

    /// Every computation that has not been stopped yet.
    live: HashMap<ComputationId, Computation>,

    /// True while a drain is running.
    in_flush: bool,

    /// True if a flush has been requested from the host or is running.
    will_flush: bool,

    /// Error mode of the running flush.
    throw_first_error: bool,

    config: TrackerConfig,
    host: Rc<dyn FlushHost>,
}

impl Scheduler {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            after_flush: VecDeque::new(),
            live: HashMap::new(),
            in_flush: false,
            will_flush: false,
            throw_first_error: false,
            config: TrackerConfig::default(),
            host: Rc::new(ManualHost),
        }
    }

    fn has_work(&self) -> bool {
        !self.pending.is_empty() || !self.after_flush.is_empty()
    }
}

thread_local! {
    static SCHEDULER: RefCell<Scheduler> = RefCell::new(Scheduler::new());
}

/// Borrow the scheduler for the duration of `f`. `f` must not call user code.
fn with<R>(f: impl FnOnce(&mut Scheduler) -> R) -> R {
    SCHEDULER.with(|scheduler| f(&mut scheduler.borrow_mut()))
}

pub(crate) fn register(computation: &Computation) {
    with(|s| s.live.insert(computation.id(), computation.clone()));
}

pub(crate) fn release(id: ComputationId) {
    let released = with(|s| s.live.remove(&id));
    drop(released);
}

pub(crate) fn enqueue(computation: Computation) {
    with(|s| s.pending.push_back(computation));
    request_flush();
}

pub(crate) fn push_after_flush(callback: AfterFlushCallback) {
    with(|s| s.after_flush.push_back(callback));
    request_flush();
}

/// Ask the host for a flush unless one is already requested or running.
pub(crate) fn request_flush() {
    request_flush_after(Duration::ZERO);
}

fn request_flush_after(delay: Duration) {
    let host = with(|s| {
        if s.will_flush {
            None
        } else {
            s.will_flush = true;
            Some(Rc::clone(&s.host))
        }
    });

    if let Some(host) = host {
        tracing::trace!(?delay, "flush requested");
        host.schedule(delay);
    }
}

pub(crate) fn set_host(host: Rc<dyn FlushHost>) {
    with(|s| s.host = host);
}

pub(crate) fn configure(config: TrackerConfig) {
    with(|s| s.config = config);
}

pub(crate) fn config() -> TrackerConfig {
    with(|s| s.config.clone())
}

pub(crate) fn in_flush() -> bool {
    with(|s| s.in_flush)
}

pub(crate) fn is_flush_scheduled() -> bool {
    with(|s| s.will_flush)
}

pub(crate) fn pending_count() -> usize {
    with(|s| s.pending.len())
}

#[cfg(test)]
fn live_count() -> usize {
    with(|s| s.live.len())
}

/// Run the flush the host was asked for, if any. Yields after
/// `yield_after` recomputes.
pub(crate) fn run_scheduled_flush() -> Result<(), TrackerError> {
    if !is_flush_scheduled() {
        return Ok(());
    }
    run_flush(false, false)
}

/// Resets the flush flags and reschedules leftover work on every exit path.
struct FlushCleanup;

impl Drop for FlushCleanup {
    fn drop(&mut self) {
        let (has_work, delay) = with(|s| {
            s.in_flush = false;
            s.will_flush = false;
            (s.has_work(), s.config.reschedule_delay)
        });

        if has_work {
            tracing::debug!(pending = pending_count(), "flush left work behind, rescheduling");
            request_flush_after(delay);
        }
    }
}

pub(crate) fn run_flush(
    finish_synchronously: bool,
    throw_first_error: bool,
) -> Result<(), TrackerError> {
    if in_flush() {
        return Err(TrackerError::FlushWhileFlushing);
    }
    if ReactiveContext::in_compute() {
        return Err(TrackerError::FlushInsideComputation);
    }

    let (yield_after, pending, callbacks) = with(|s| {
        s.in_flush = true;
        s.will_flush = true;
        s.throw_first_error = throw_first_error;
        (s.config.yield_threshold(), s.pending.len(), s.after_flush.len())
    });
    let _cleanup = FlushCleanup;

    tracing::debug!(
        pending,
        callbacks,
        synchronous = finish_synchronously,
        "flush started"
    );

    let mut first_error: Option<TrackerError> = None;
    let mut recomputed = 0usize;

    loop {
        while let Some(computation) = with(|s| s.pending.pop_front()) {
            let result = computation.recompute();
            if computation.needs_recompute() {
                with(|s| s.pending.push_back(computation));
            }

            if let Err(err) = result {
                if !finish_synchronously && !with(|s| s.throw_first_error) {
                    return Err(err);
                }
                if first_error.is_none() {
                    first_error = Some(err);
                } else {
                    tracing::error!(error = %err, "recompute failed during flush");
                }
            }

            recomputed += 1;
            if !finish_synchronously && recomputed >= yield_after {
                tracing::debug!(recomputed, "flush yielding to host");
                return first_error.map_or(Ok(()), Err);
            }
        }

        let Some(callback) = with(|s| s.after_flush.pop_front()) else {
            break;
        };
        if let Err(source) = nonreactive(callback) {
            let err = TrackerError::AfterFlush { source };
            return Err(match first_error {
                Some(first) => {
                    tracing::error!(error = %err, "after-flush callback failed during flush");
                    first
                }
                None => err,
            });
        }
    }

    tracing::debug!(recomputed, "flush finished");
    first_error.map_or(Ok(()), Err)
}
