use std::sync::Arc;

/// Point-in-time view of a batch's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    /// Fraction in `[0, 1]`; an empty batch reports `0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// Receives one snapshot per completed extraction, plus the initial one.
pub type ProgressCallback = Arc<dyn Fn(ProgressSnapshot) + Send + Sync>;

/// Completed/total counters driven by the batch orchestrator.
#[derive(Debug)]
pub struct ProgressAggregator {
    completed: usize,
    total: usize,
}

impl ProgressAggregator {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    /// Counts one finished unit. Saturates at `total`.
    pub fn record_completion(&mut self) -> ProgressSnapshot {
        debug_assert!(self.completed < self.total, "more completions than units");
        self.completed = (self.completed + 1).min(self.total);
        self.snapshot()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed,
            total: self.total,
        }
    }

    pub fn fraction(&self) -> f64 {
        self.snapshot().fraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_zero_fraction_for_empty_batch() {
        let aggregator = ProgressAggregator::new(0);

        assert_eq!(aggregator.fraction(), 0.0);
        assert!(aggregator.snapshot().is_complete());
    }

    #[test]
    fn should_advance_one_completion_at_a_time() {
        let mut aggregator = ProgressAggregator::new(4);

        let first = aggregator.record_completion();
        let second = aggregator.record_completion();

        assert_eq!(first, ProgressSnapshot { completed: 1, total: 4 });
        assert_eq!(second, ProgressSnapshot { completed: 2, total: 4 });
        assert_eq!(aggregator.fraction(), 0.5);
        assert!(!second.is_complete());
    }

    #[test]
    fn should_reach_full_fraction_when_all_units_complete() {
        let mut aggregator = ProgressAggregator::new(3);

        for _ in 0..3 {
            aggregator.record_completion();
        }

        assert_eq!(aggregator.fraction(), 1.0);
        assert!(aggregator.snapshot().is_complete());
    }
}
