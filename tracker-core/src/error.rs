//! Error Types
//!
//! Every fallible operation in the crate returns [`TrackerError`]. Errors
//! produced by user code (computation bodies and after-flush callbacks) are
//! carried as a boxed [`BodyError`] inside the variant that names the phase
//! they came from.

use thiserror::Error;

use crate::reactive::ComputationId;

/// Error type returned by computation bodies and after-flush callbacks.
pub type BodyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias for computation bodies and after-flush callbacks.
pub type BodyResult = Result<(), BodyError>;

/// Errors surfaced by the tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A flush was requested while another flush was draining.
    #[error("can't flush while flushing")]
    FlushWhileFlushing,

    /// A flush was requested from inside a running computation body.
    #[error("can't flush inside a computation body")]
    FlushInsideComputation,

    /// An invalidation hook was registered with no active computation.
    #[error("on_invalidate requires a current computation")]
    NoCurrentComputation,

    /// The body failed on its initial run. The computation has been stopped.
    #[error("computation {id} failed on its first run: {source}")]
    FirstRun {
        id: ComputationId,
        #[source]
        source: BodyError,
    },

    /// The body failed during a recompute and no error handler was installed.
    #[error("computation {id} failed during recompute: {source}")]
    Recompute {
        id: ComputationId,
        #[source]
        source: BodyError,
    },

    /// An after-flush callback failed.
    #[error("exception from after-flush callback: {source}")]
    AfterFlush {
        #[source]
        source: BodyError,
    },
}

impl TrackerError {
    /// True for errors caused by calling the tracker in an illegal state.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::FlushWhileFlushing | Self::FlushInsideComputation | Self::NoCurrentComputation
        )
    }

    /// The computation the error originated from, if any.
    pub fn computation_id(&self) -> Option<ComputationId> {
        match self {
            Self::FirstRun { id, .. } | Self::Recompute { id, .. } => Some(*id),
            _ => None,
        }
    }
}
