//! Computation identifiers.
//!
//! Dependencies key their dependents by id, and the scheduler keys its
//! registry of live computations the same way.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a computation.
///
/// Ids increase monotonically in creation order and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComputationId(u64);

impl ComputationId {
    /// Generate the next id.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComputationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_monotonically() {
        let id1 = ComputationId::next();
        let id2 = ComputationId::next();
        let id3 = ComputationId::next();

        assert!(id1 < id2);
        assert!(id2 < id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn display_uses_raw_value() {
        let id = ComputationId::next();
        assert_eq!(id.to_string(), format!("#{}", id.raw()));
    }
}
