//! Computation Implementation
//!
//! A Computation is a re-runnable unit of work. Its body reads
//! dependencies, which record the computation as a dependent; when one of
//! them changes, the computation is invalidated and the scheduler reruns it
//! on the next flush.
//!
//! # Lifecycle
//!
//! 1. Created by [`autorun`](crate::tracker::autorun). The body runs once,
//!    synchronously, with the new computation current. `is_first_run()` is
//!    true only during that run.
//!
//! 2. [`invalidate`](Computation::invalidate) marks it stale, enqueues it on
//!    the scheduler and fires the one-shot invalidation callbacks.
//!
//! 3. On flush the body reruns and re-establishes its dependencies.
//!
//! 4. [`stop`](Computation::stop) is terminal: the computation is
//!    invalidated one last time, the stop callbacks fire, and it never
//!    reruns again.
//!
//! # Errors
//!
//! A body returns [`BodyResult`]. A failure on the first run stops the
//! computation and is returned to the creator. A failure on a recompute
//! goes to the error handler if one was installed, otherwise it is
//! escalated to whoever drove the recompute.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use super::context::{self, ReactiveContext};
use super::id::ComputationId;
use crate::error::{BodyError, BodyResult, TrackerError};
use crate::flush::scheduler;

pub(crate) type Body = Box<dyn Fn(&Computation) -> BodyResult>;
pub(crate) type ErrorHandler = Box<dyn Fn(BodyError)>;
type Callback = Box<dyn FnOnce(&Computation)>;
type Callbacks = SmallVec<[Callback; 2]>;

pub(crate) struct ComputationInner {
    id: ComputationId,
    body: Body,
    parent: Option<Weak<ComputationInner>>,
    on_error: Option<ErrorHandler>,
    stopped: Cell<bool>,
    invalidated: Cell<bool>,
    first_run: Cell<bool>,
    recomputing: Cell<bool>,
    on_invalidate: RefCell<Callbacks>,
    on_stop: RefCell<Callbacks>,
}

/// Handle to a reactive computation.
///
/// Handles are cheap to clone; all clones refer to the same computation.
/// The scheduler keeps a live computation alive until it is stopped, so
/// dropping every handle does not stop it.
#[derive(Clone)]
pub struct Computation {
    inner: Rc<ComputationInner>,
}

/// Non-owning handle to a computation.
#[derive(Clone)]
pub(crate) struct WeakComputation {
    inner: Weak<ComputationInner>,
}

impl WeakComputation {
    pub(crate) fn upgrade(&self) -> Option<Computation> {
        self.inner.upgrade().map(|inner| Computation { inner })
    }
}

/// Clears the recomputing flag on every exit path.
struct RecomputeGuard<'a>(&'a Cell<bool>);

impl<'a> RecomputeGuard<'a> {
    fn new(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for RecomputeGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Computation {
    /// Create a computation and run its body once.
    ///
    /// The parent link is informational; stopping the child when the parent
    /// invalidates is wired by the caller.
    pub(crate) fn new(
        body: Body,
        parent: Option<&Computation>,
        on_error: Option<ErrorHandler>,
    ) -> Result<Self, TrackerError> {
        let computation = Self {
            inner: Rc::new(ComputationInner {
                id: ComputationId::next(),
                body,
                parent: parent.map(|p| Rc::downgrade(&p.inner)),
                on_error,
                stopped: Cell::new(false),
                invalidated: Cell::new(false),
                first_run: Cell::new(true),
                recomputing: Cell::new(false),
                on_invalidate: RefCell::new(SmallVec::new()),
                on_stop: RefCell::new(SmallVec::new()),
            }),
        };
        scheduler::register(&computation);
        tracing::trace!(computation = %computation.id(), "computation created");

        let result = computation.compute();
        computation.inner.first_run.set(false);

        match result {
            Ok(()) => Ok(computation),
            Err(source) => {
                computation.stop();
                Err(TrackerError::FirstRun {
                    id: computation.id(),
                    source,
                })
            }
        }
    }

    /// Get the computation's unique ID.
    pub fn id(&self) -> ComputationId {
        self.inner.id
    }

    /// True if this computation has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.get()
    }

    /// True if this computation has been invalidated and not yet rerun, or
    /// if it has been stopped.
    pub fn is_invalidated(&self) -> bool {
        self.inner.invalidated.get()
    }

    /// True only during the initial run of the body.
    pub fn is_first_run(&self) -> bool {
        self.inner.first_run.get()
    }

    /// The computation that was current when this one was created, if it is
    /// still alive.
    pub fn parent(&self) -> Option<Computation> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Computation { inner })
    }

    /// Register `callback` to run when this computation is next invalidated.
    ///
    /// If the computation is already invalidated, the callback runs
    /// immediately. Callbacks run with no current computation, once, in
    /// registration order.
    pub fn on_invalidate<F>(&self, callback: F)
    where
        F: FnOnce(&Computation) + 'static,
    {
        if self.is_invalidated() {
            context::nonreactive(|| callback(self));
        } else {
            self.inner.on_invalidate.borrow_mut().push(Box::new(callback));
        }
    }

    /// Register `callback` to run when this computation is stopped.
    ///
    /// Runs immediately if the computation is already stopped. Stop
    /// callbacks always run after the final invalidation callbacks.
    pub fn on_stop<F>(&self, callback: F)
    where
        F: FnOnce(&Computation) + 'static,
    {
        if self.is_stopped() {
            context::nonreactive(|| callback(self));
        } else {
            self.inner.on_stop.borrow_mut().push(Box::new(callback));
        }
    }

    /// Invalidate this computation so that it reruns on the next flush.
    pub fn invalidate(&self) {
        let inner = &self.inner;
        if inner.invalidated.get() {
            return;
        }

        // A computation inside its own recompute is requeued by the drain loop.
        if !inner.recomputing.get() && !inner.stopped.get() {
            scheduler::enqueue(self.clone());
        }

        inner.invalidated.set(true);

        // Registrations made while firing see `invalidated` and run at once.
        let callbacks = std::mem::take(&mut *inner.on_invalidate.borrow_mut());
        for callback in callbacks {
            context::nonreactive(|| callback(self));
        }
    }

    /// Stop this computation. It will never rerun. Idempotent.
    pub fn stop(&self) {
        let inner = &self.inner;
        if inner.stopped.get() {
            return;
        }

        inner.stopped.set(true);
        self.invalidate();

        let callbacks = std::mem::take(&mut *inner.on_stop.borrow_mut());
        for callback in callbacks {
            context::nonreactive(|| callback(self));
        }

        tracing::trace!(computation = %inner.id, "computation stopped");
        scheduler::release(inner.id);
    }

    /// Recompute now if invalidated, without waiting for the scheduler.
    ///
    /// Does nothing while this computation is already recomputing.
    pub fn flush(&self) -> Result<(), TrackerError> {
        if self.inner.recomputing.get() {
            return Ok(());
        }

        let result = self.recompute();
        if self.needs_recompute() {
            // Invalidated itself during the rerun; hand it to the scheduler.
            scheduler::enqueue(self.clone());
        }
        result
    }

    /// Invalidate and immediately rerun this computation.
    pub fn run(&self) -> Result<(), TrackerError> {
        self.invalidate();
        self.flush()
    }

    pub(crate) fn downgrade(&self) -> WeakComputation {
        WeakComputation {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn needs_recompute(&self) -> bool {
        self.is_invalidated() && !self.is_stopped()
    }

    pub(crate) fn recompute(&self) -> Result<(), TrackerError> {
        let _recomputing = RecomputeGuard::new(&self.inner.recomputing);
        if !self.needs_recompute() {
            return Ok(());
        }

        tracing::trace!(computation = %self.id(), "recomputing");
        match self.compute() {
            Ok(()) => Ok(()),
            Err(source) => match &self.inner.on_error {
                Some(handler) => {
                    handler(source);
                    Ok(())
                }
                None => Err(TrackerError::Recompute {
                    id: self.id(),
                    source,
                }),
            },
        }
    }

    fn compute(&self) -> BodyResult {
        self.inner.invalidated.set(false);
        let _ctx = ReactiveContext::enter(self);
        (self.inner.body)(self)
    }
}

impl PartialEq for Computation {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Computation {}

impl fmt::Debug for Computation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computation")
            .field("id", &self.id())
            .field("stopped", &self.is_stopped())
            .field("invalidated", &self.is_invalidated())
            .field("first_run", &self.is_first_run())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
