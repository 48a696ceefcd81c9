use crate::domain::{AttemptStatus, MetricsSnapshot};

/// Incremental aggregate over completed attempts: O(1) per update, no
/// recomputation over history.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    snapshot: MetricsSnapshot,
}

impl MetricsAggregator {
    /// Folds one completed attempt into the counters.
    ///
    /// The running mean uses the pre-increment total as the weight of the old
    /// average and the post-increment total as the divisor, rounded half-up,
    /// so after `n` updates `avg_ms` equals the integer-rounded mean of all
    /// `n` elapsed times (modulo per-step rounding drift of at most one).
    pub fn update(&mut self, elapsed_ms: u64, status_code: u16) {
        let previous_total = self.snapshot.total;
        let total = previous_total.saturating_add(1);

        let weighted = u128::from(self.snapshot.avg_ms)
            .saturating_mul(u128::from(previous_total))
            .saturating_add(u128::from(elapsed_ms));
        let divisor = u128::from(total);
        let half = divisor.checked_div(2).unwrap_or(0);
        let average = weighted
            .saturating_add(half)
            .checked_div(divisor)
            .unwrap_or(0);

        self.snapshot.total = total;
        self.snapshot.avg_ms = u64::try_from(average).unwrap_or(u64::MAX);

        match AttemptStatus::from_status_code(status_code) {
            AttemptStatus::RateLimited => {
                self.snapshot.rate_limit = self.snapshot.rate_limit.saturating_add(1);
            }
            AttemptStatus::Ok => {
                self.snapshot.ok = self.snapshot.ok.saturating_add(1);
            }
            AttemptStatus::Error => {
                self.snapshot.error = self.snapshot.error.saturating_add(1);
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.snapshot.clone()
    }
}
