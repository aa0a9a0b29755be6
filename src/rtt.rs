//! Adaptive retransmission-timeout estimation.
//!
//! [`RttEstimator`] keeps an append-only list of round-trip samples, one per
//! accepted (non-duplicate) cumulative ACK, and derives the next wait budget
//! from their arithmetic mean:
//!
//! ```text
//! timeout = max(100 ms, 2 × mean(samples))     (300 ms before any sample)
//! ```
//!
//! Recomputed before every wait, so the timeout tracks the link as samples
//! accumulate.  The sample list is kept in full because the final statistics
//! report needs the raw distribution, not just a smoothed estimate.

use std::time::Duration;

/// Timeout used before the first RTT sample exists.
pub const INITIAL_TIMEOUT: Duration = Duration::from_millis(300);

/// Lower bound on the adaptive timeout.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Running RTT sample list plus the timeout derived from it.
#[derive(Debug, Default)]
pub struct RttEstimator {
    samples: Vec<Duration>,
}

impl RttEstimator {
    /// Create an estimator with no samples.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one round-trip sample.
    pub fn record(&mut self, rtt: Duration) {
        self.samples.push(rtt);
    }

    /// All samples recorded so far, in arrival order.
    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    /// Arithmetic mean of the samples, or `None` when there are none.
    pub fn mean(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: Duration = self.samples.iter().sum();
        Some(sum / self.samples.len() as u32)
    }

    /// The wait budget for the next ACK.
    pub fn timeout(&self) -> Duration {
        match self.mean() {
            Some(mean) => (mean * 2).max(MIN_TIMEOUT),
            None => INITIAL_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_samples_uses_initial_timeout() {
        assert_eq!(RttEstimator::new().timeout(), Duration::from_millis(300));
    }

    #[test]
    fn timeout_is_twice_the_mean() {
        let mut e = RttEstimator::new();
        for ms in [50, 70, 90] {
            e.record(Duration::from_millis(ms));
        }
        // mean = 70 ms, doubled = 140 ms, above the 100 ms floor
        assert_eq!(e.timeout(), Duration::from_millis(140));
    }

    #[test]
    fn timeout_never_drops_below_floor() {
        let mut e = RttEstimator::new();
        for ms in [10, 20, 30] {
            e.record(Duration::from_millis(ms));
        }
        // 2 × 20 ms = 40 ms would be below the floor
        assert_eq!(e.timeout(), Duration::from_millis(100));
    }

    #[test]
    fn samples_are_kept_in_arrival_order() {
        let mut e = RttEstimator::new();
        e.record(Duration::from_millis(90));
        e.record(Duration::from_millis(50));
        assert_eq!(
            e.samples(),
            &[Duration::from_millis(90), Duration::from_millis(50)]
        );
        assert_eq!(e.mean(), Some(Duration::from_millis(70)));
    }
}
