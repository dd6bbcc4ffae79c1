//! Dispatch pacing and request accounting for upstream fetches.
//!
//! The ingestion controller starts fetches one at a time at a fixed interval
//! and lets them overlap; [`DispatchGate`] enforces that spacing.
//! [`RequestTracker`] counts what came back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Fixed-interval gate: successive `acquire()` calls return at least
/// `interval` apart. The first call returns immediately.
pub struct DispatchGate {
    next_slot: Mutex<Option<Instant>>,
    interval: Duration,
}

impl DispatchGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            next_slot: Mutex::new(None),
            interval,
        }
    }

    /// Wait for the next free slot and claim it.
    ///
    /// The slot is reserved under the lock before sleeping; concurrent
    /// callers end up one interval apart.
    pub async fn acquire(&self) {
        let wait_until = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(t) if t > now => t,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };
        sleep_until(wait_until).await;
    }

    /// Forget the previous dispatch so the next `acquire()` is immediate.
    pub async fn reset(&self) {
        *self.next_slot.lock().await = None;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Atomic counters tracking fetch outcomes.
#[derive(Default)]
pub struct RequestTracker {
    pub(crate) requests_made: AtomicU64,
    pub(crate) requests_succeeded: AtomicU64,
    pub(crate) requests_failed: AtomicU64,
    /// Cumulative cooldown time in milliseconds.
    pub(crate) total_cooldown_ms: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cooldown(&self, duration: Duration) {
        self.total_cooldown_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Snapshot the current counters.
    pub fn summary(&self) -> TrackerSummary {
        TrackerSummary {
            requests_made: self.requests_made.load(Ordering::Relaxed),
            requests_succeeded: self.requests_succeeded.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            total_cooldown_secs: self.total_cooldown_ms.load(Ordering::Relaxed) as f64 / 1000.0,
        }
    }
}

/// Immutable snapshot of tracker counters for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackerSummary {
    pub requests_made: u64,
    pub requests_succeeded: u64,
    pub requests_failed: u64,
    pub total_cooldown_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn first_acquire_is_immediate() {
        tokio::time::pause();
        let gate = DispatchGate::new(Duration::from_millis(100));
        let start = Instant::now();
        gate.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn successive_acquires_are_spaced() {
        tokio::time::pause();
        let gate = DispatchGate::new(Duration::from_millis(100));
        let start = Instant::now();
        for _ in 0..4 {
            gate.acquire().await;
        }
        // 0, 100, 200, 300
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn concurrent_callers_queue_behind_each_other() {
        tokio::time::pause();
        let gate = Arc::new(DispatchGate::new(Duration::from_millis(100)));
        gate.acquire().await;

        let g = Arc::clone(&gate);
        let second = tokio::spawn(async move { g.acquire().await });
        let g = Arc::clone(&gate);
        let third = tokio::spawn(async move { g.acquire().await });

        tokio::time::advance(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert!(second.is_finished() || third.is_finished());
        assert!(!(second.is_finished() && third.is_finished()));

        tokio::time::advance(Duration::from_millis(100)).await;
        second.await.unwrap();
        third.await.unwrap();
    }

    #[tokio::test]
    async fn idle_gap_does_not_accumulate_credit() {
        tokio::time::pause();
        let gate = DispatchGate::new(Duration::from_millis(100));
        gate.acquire().await;
        tokio::time::advance(Duration::from_secs(5)).await;

        let start = Instant::now();
        gate.acquire().await;
        gate.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn reset_clears_pending_slot() {
        tokio::time::pause();
        let gate = DispatchGate::new(Duration::from_secs(10));
        gate.acquire().await;
        gate.reset().await;
        let start = Instant::now();
        gate.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn tracker_counters() {
        let tracker = RequestTracker::new();
        tracker.record_success();
        tracker.record_success();
        tracker.record_failure();
        tracker.record_cooldown(Duration::from_secs(2));

        let summary = tracker.summary();
        assert_eq!(summary.requests_made, 3);
        assert_eq!(summary.requests_succeeded, 2);
        assert_eq!(summary.requests_failed, 1);
        assert!((summary.total_cooldown_secs - 2.0).abs() < 0.01);
    }
}
