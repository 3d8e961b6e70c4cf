//! Tracker entry points.
//!
//! These free functions are the caller-facing surface: creating
//! computations, escaping tracking, registering hooks, deferring work until
//! the next flush has settled, and flushing.

use std::rc::Rc;

use crate::config::TrackerConfig;
use crate::error::{BodyError, BodyResult, TrackerError};
use crate::flush::{scheduler, FlushHost};
use crate::reactive::{Body, Computation, ErrorHandler, ReactiveContext};

pub use crate::reactive::nonreactive;

/// Options for an explicit [`flush_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOptions {
    /// Drain the whole backlog even if a recompute fails, then return the
    /// first failure.
    pub throw_first_error: bool,
}

/// Run `body` now and rerun it whenever its dependencies change.
///
/// If a computation is current, the new one becomes its child and is
/// stopped when the parent is next invalidated. A failure on the first run
/// stops the computation and is returned here.
pub fn autorun<F>(body: F) -> Result<Computation, TrackerError>
where
    F: Fn(&Computation) -> BodyResult + 'static,
{
    spawn(Box::new(body), None)
}

/// Like [`autorun`], with a handler for errors returned by reruns.
///
/// The handler never sees a first-run error.
pub fn autorun_with_error_handler<F, E>(body: F, on_error: E) -> Result<Computation, TrackerError>
where
    F: Fn(&Computation) -> BodyResult + 'static,
    E: Fn(BodyError) + 'static,
{
    spawn(Box::new(body), Some(Box::new(on_error)))
}

fn spawn(body: Body, on_error: Option<ErrorHandler>) -> Result<Computation, TrackerError> {
    let parent = ReactiveContext::current();
    let computation = Computation::new(body, parent.as_ref(), on_error)?;

    if let Some(parent) = parent {
        let child = computation.clone();
        parent.on_invalidate(move |_| child.stop());
    }

    Ok(computation)
}

/// Register `callback` on the current computation's next invalidation.
pub fn on_invalidate<F>(callback: F) -> Result<(), TrackerError>
where
    F: FnOnce(&Computation) + 'static,
{
    let computation = ReactiveContext::current().ok_or(TrackerError::NoCurrentComputation)?;
    computation.on_invalidate(callback);
    Ok(())
}

/// Run `callback` once, during the next flush, at a point where no
/// computation is waiting to rerun.
pub fn after_flush<F>(callback: F)
where
    F: FnOnce() -> BodyResult + 'static,
{
    scheduler::push_after_flush(Box::new(callback));
}

/// Rerun every invalidated computation and run every after-flush callback.
///
/// Blocks until both queues are empty. Fails if called while flushing or
/// from inside a computation body, without touching either queue.
pub fn flush() -> Result<(), TrackerError> {
    flush_with(FlushOptions::default())
}

/// [`flush`] with options.
pub fn flush_with(options: FlushOptions) -> Result<(), TrackerError> {
    scheduler::run_flush(true, options.throw_first_error)
}

/// Run the host-requested flush, if one is outstanding.
///
/// Unlike [`flush`], this pass yields after
/// [`TrackerConfig::yield_after`] recomputes and asks the host for another.
pub fn run_scheduled_flush() -> Result<(), TrackerError> {
    scheduler::run_scheduled_flush()
}

/// True if there is a current computation.
pub fn is_active() -> bool {
    ReactiveContext::is_active()
}

/// The current computation, if any.
pub fn current_computation() -> Option<Computation> {
    ReactiveContext::current()
}

/// True while a flush is draining.
pub fn in_flush() -> bool {
    scheduler::in_flush()
}

/// True if a flush has been requested and has not run yet, or is running.
pub fn is_flush_scheduled() -> bool {
    scheduler::is_flush_scheduled()
}

/// Install the host that runs requested flushes on this thread.
pub fn set_flush_host(host: impl FlushHost + 'static) {
    scheduler::set_host(Rc::new(host));
}

/// Install scheduler configuration on this thread.
pub fn configure(config: TrackerConfig) {
    scheduler::configure(config);
}

/// The scheduler configuration in effect on this thread.
pub fn config() -> TrackerConfig {
    scheduler::config()
}
