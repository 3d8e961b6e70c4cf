//! Scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning knobs for the flush scheduler.
///
/// Missing fields take their default when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Recomputes processed by one host-driven flush pass before it yields
    /// back to the host. Values below 1 behave as 1. Explicit flushes never
    /// yield.
    pub yield_after: usize,

    /// Delay before a pass that left work behind asks the host for another.
    pub reschedule_delay: Duration,
}

impl TrackerConfig {
    pub const DEFAULT_YIELD_AFTER: usize = 1000;
    pub const DEFAULT_RESCHEDULE_DELAY: Duration = Duration::from_millis(10);

    pub fn with_yield_after(mut self, yield_after: usize) -> Self {
        self.yield_after = yield_after;
        self
    }

    pub fn with_reschedule_delay(mut self, delay: Duration) -> Self {
        self.reschedule_delay = delay;
        self
    }

    pub(crate) fn yield_threshold(&self) -> usize {
        self.yield_after.max(1)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            yield_after: Self::DEFAULT_YIELD_AFTER,
            reschedule_delay: Self::DEFAULT_RESCHEDULE_DELAY,
        }
    }
}
