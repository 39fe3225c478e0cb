//! Per-run join barrier over a growing set of type lookups.

use crate::types::AttributeDefinition;

/// Counts unsettled fetches for one resolution run.
///
/// `issue` is called before a fetch is handed to the task group, `settle`
/// after its outcome has been processed (including any child fetches it
/// issued). `settle` reports the transition to zero exactly once.
#[derive(Debug, Default)]
pub struct PendingFetches {
    pending: usize,
    issued: usize,
    fired: bool,
}

impl PendingFetches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) {
        self.pending += 1;
        self.issued += 1;
    }

    /// Returns true when this settlement drained the barrier for the first time.
    pub fn settle(&mut self) -> bool {
        debug_assert!(self.pending > 0, "settle without a matching issue");
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 && !self.fired {
            self.fired = true;
            return true;
        }
        false
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn is_complete(&self) -> bool {
        self.fired
    }
}

/// Accumulated attributes plus the barrier for one run.
#[derive(Debug, Default)]
pub struct ResolutionState {
    accumulated: Vec<AttributeDefinition>,
    barrier: PendingFetches,
    failed: usize,
    depth_limited: usize,
    cycle_skipped: usize,
}

impl ResolutionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes in settlement order. Duplicates are kept.
    pub fn accumulated(&self) -> &[AttributeDefinition] {
        &self.accumulated
    }

    pub fn pending(&self) -> usize {
        self.barrier.pending()
    }

    pub fn issued(&self) -> usize {
        self.barrier.issued()
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn depth_limited(&self) -> usize {
        self.depth_limited
    }

    pub fn cycle_skipped(&self) -> usize {
        self.cycle_skipped
    }

    pub(crate) fn barrier_mut(&mut self) -> &mut PendingFetches {
        &mut self.barrier
    }

    pub(crate) fn append(&mut self, attributes: Vec<AttributeDefinition>) {
        self.accumulated.extend(attributes);
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub(crate) fn record_depth_limited(&mut self) {
        self.depth_limited += 1;
    }

    pub(crate) fn record_cycle_skipped(&mut self) {
        self.cycle_skipped += 1;
    }

    pub(crate) fn into_accumulated(self) -> Vec<AttributeDefinition> {
        self.accumulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_on_drain() {
        let mut barrier = PendingFetches::new();
        barrier.issue();
        assert!(barrier.settle());
        assert!(barrier.is_complete());
        assert_eq!(barrier.pending(), 0);
    }

    #[test]
    fn children_issued_before_parent_settles_hold_the_barrier() {
        let mut barrier = PendingFetches::new();
        barrier.issue();
        // parent's handler issues two children, then settles
        barrier.issue();
        barrier.issue();
        assert!(!barrier.settle());
        assert!(!barrier.settle());
        assert!(barrier.settle());
        assert_eq!(barrier.issued(), 3);
    }

    #[test]
    fn does_not_fire_twice() {
        let mut barrier = PendingFetches::new();
        barrier.issue();
        assert!(barrier.settle());
        barrier.issue();
        assert!(!barrier.settle());
    }
}
