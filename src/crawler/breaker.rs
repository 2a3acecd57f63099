//! Consecutive-failure circuit breaker

use std::sync::atomic::{AtomicU32, Ordering};

/// Shared counter of consecutive fetch failures across all workers in a run
///
/// Any success resets the count; each failure increments it atomically and
/// the incremented value is compared against the threshold, so exactly one
/// worker observes each crossing even when failures race. The policy is
/// deliberately global rather than per-host: a cluster of persistently
/// broken links halts the whole run.
#[derive(Debug)]
pub struct CircuitBreaker {
    consecutive: AtomicU32,
    max_errors: u32,
}

impl CircuitBreaker {
    pub fn new(max_errors: u32) -> Self {
        Self {
            consecutive: AtomicU32::new(0),
            max_errors,
        }
    }

    /// Records a failed fetch.
    ///
    /// Returns the updated consecutive count once it exceeds the threshold;
    /// the caller turns that into a fatal abort.
    pub fn record_failure(&self) -> Option<u32> {
        let count = self.consecutive.fetch_add(1, Ordering::SeqCst) + 1;
        (count > self.max_errors).then_some(count)
    }

    /// Records a successful fetch, ending the current run of failures.
    pub fn record_success(&self) {
        self.consecutive.store(0, Ordering::SeqCst);
    }

    /// Snapshot of the current consecutive-failure count, for telemetry.
    pub fn current(&self) -> u32 {
        self.consecutive.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trips_on_threshold_plus_one() {
        let breaker = CircuitBreaker::new(3);

        for _ in 0..3 {
            assert_eq!(breaker.record_failure(), None);
        }
        assert_eq!(breaker.record_failure(), Some(4));
    }

    #[test]
    fn test_success_resets_the_run() {
        let breaker = CircuitBreaker::new(2);

        assert_eq!(breaker.record_failure(), None);
        assert_eq!(breaker.record_failure(), None);
        breaker.record_success();

        // a fresh run of two failures stays below the threshold
        assert_eq!(breaker.record_failure(), None);
        assert_eq!(breaker.record_failure(), None);
        assert_eq!(breaker.record_failure(), Some(3));
    }

    #[test]
    fn test_current_snapshot() {
        let breaker = CircuitBreaker::new(10);
        assert_eq!(breaker.current(), 0);

        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.current(), 2);

        breaker.record_success();
        assert_eq!(breaker.current(), 0);
    }

    #[test]
    fn test_zero_threshold_trips_immediately() {
        let breaker = CircuitBreaker::new(0);
        assert_eq!(breaker.record_failure(), Some(1));
    }
}
