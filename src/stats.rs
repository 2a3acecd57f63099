//! Session counters and the background statistics reporter
//!
//! Counters here are monitoring telemetry, never inputs to correctness
//! decisions: workers bump them atomically and the reporter reads snapshot
//! values without locking anything.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::crawler::CircuitBreaker;
use crate::frontier::{Frontier, SetCounts};

/// Transient per-run counters shared across workers
#[derive(Debug)]
pub struct CrawlSession {
    parsed: AtomicU64,
    started: Mutex<Instant>,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self {
            parsed: AtomicU64::new(0),
            started: Mutex::new(Instant::now()),
        }
    }

    /// Clears the counters at the start of a run.
    pub fn reset(&self) {
        self.parsed.store(0, Ordering::Relaxed);
        *self.started.lock().unwrap() = Instant::now();
    }

    /// Bumps the parsed-page counter.
    pub fn record_parsed(&self) {
        self.parsed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn parsed(&self) -> u64 {
        self.parsed.load(Ordering::Relaxed)
    }

    /// URLs parsed per minute since the run started.
    pub fn rate_per_minute(&self) -> u64 {
        let secs = self.started.lock().unwrap().elapsed().as_secs_f64();
        if secs <= 0.0 {
            return 0;
        }
        (60.0 * self.parsed() as f64 / secs).round() as u64
    }

    /// Logs the closing summary once a run stops.
    pub fn log_summary(&self, counts: &SetCounts, errors: u32) {
        tracing::info!(
            parsed = self.parsed(),
            todo = counts.todo,
            doing = counts.doing,
            done = counts.done,
            trash = counts.trash,
            errors,
            "crawl finished"
        );
    }
}

impl Default for CrawlSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Polls shared counters and logs one progress line per interval.
///
/// Runs independently of the scheduler with no ordering guarantees against
/// it. The loop wakes frequently so it can stop promptly when `run_flag`
/// clears; there is no final tick on shutdown.
pub async fn run_reporter(
    frontier: Frontier,
    session: Arc<CrawlSession>,
    breaker: Arc<CircuitBreaker>,
    run_flag: Arc<AtomicBool>,
    interval_secs: u64,
) {
    let poll = Duration::from_millis(250);
    let mut since_report = Duration::ZERO;

    while run_flag.load(Ordering::SeqCst) {
        tokio::time::sleep(poll).await;
        since_report += poll;
        if since_report < Duration::from_secs(interval_secs.max(1)) {
            continue;
        }
        since_report = Duration::ZERO;

        // best effort: a failed poll skips the line rather than erroring
        let counts = frontier.counts().await.unwrap_or_default();
        tracing::info!(
            parsed = session.parsed(),
            per_minute = session.rate_per_minute(),
            todo = counts.todo,
            done = counts.done,
            doing = counts.doing,
            trash = counts.trash,
            errors = breaker.current(),
            "progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_reset() {
        let session = CrawlSession::new();
        assert_eq!(session.parsed(), 0);

        session.record_parsed();
        session.record_parsed();
        assert_eq!(session.parsed(), 2);

        session.reset();
        assert_eq!(session.parsed(), 0);
    }

    #[test]
    fn test_rate_is_zero_without_parses() {
        let session = CrawlSession::new();
        assert_eq!(session.rate_per_minute(), 0);
    }

    #[tokio::test]
    async fn test_reporter_stops_on_flag() {
        let frontier = Frontier::new(Arc::new(crate::store::MemoryStore::new()));
        let session = Arc::new(CrawlSession::new());
        let breaker = Arc::new(CircuitBreaker::new(10));
        let run_flag = Arc::new(AtomicBool::new(true));

        let handle = tokio::spawn(run_reporter(
            frontier,
            session,
            breaker,
            Arc::clone(&run_flag),
            1,
        ));

        run_flag.store(false, Ordering::SeqCst);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("reporter did not stop")
            .unwrap();
    }
}
