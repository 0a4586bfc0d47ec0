//! Upload completion accounting.
//!
//! # Responsibilities
//! - Count uploads whose body verified against the sequence
//! - Count uploads that failed verification or could not be read
//! - Let the driving test wait for an expected total
//!
//! # Design Decisions
//! - One handle per harness, cloned into the handler state
//! - Plain `fetch_add`; concurrent handlers never lose an increment

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Default)]
struct Counters {
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Shared counter of verified uploads.
#[derive(Debug, Clone, Default)]
pub struct UploadTracker {
    counters: Arc<Counters>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one fully verified upload.
    pub fn increment(&self) {
        self.counters.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of verified uploads since the last reset.
    pub fn read(&self) -> u64 {
        self.counters.completed.load(Ordering::SeqCst)
    }

    /// Record one upload that was rejected.
    pub fn record_failure(&self) {
        self.counters.failed.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of rejected uploads since the last reset.
    pub fn failures(&self) -> u64 {
        self.counters.failed.load(Ordering::SeqCst)
    }

    /// Zero both counters. Called at the start of every scenario.
    pub fn reset(&self) {
        self.counters.completed.store(0, Ordering::SeqCst);
        self.counters.failed.store(0, Ordering::SeqCst);
    }

    /// Wait until at least `target` uploads have verified.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub async fn wait_for(&self, target: u64, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            while self.read() < target {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await
        .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_resets() {
        let tracker = UploadTracker::new();
        assert_eq!(tracker.read(), 0);

        tracker.increment();
        tracker.increment();
        tracker.record_failure();
        assert_eq!(tracker.read(), 2);
        assert_eq!(tracker.failures(), 1);

        tracker.reset();
        assert_eq!(tracker.read(), 0);
        assert_eq!(tracker.failures(), 0);
    }

    #[test]
    fn clones_share_state() {
        let tracker = UploadTracker::new();
        let handle = tracker.clone();
        handle.increment();
        assert_eq!(tracker.read(), 1);
    }

    #[test]
    fn no_lost_increments_across_threads() {
        let tracker = UploadTracker::new();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                std::thread::spawn(move || {
                    for _ in 0..10_000 {
                        tracker.increment();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
        assert_eq!(tracker.read(), 80_000);
    }

    #[tokio::test]
    async fn wait_for_sees_late_increments() {
        let tracker = UploadTracker::new();
        let writer = tracker.clone();
        tokio::spawn(async move {
            for _ in 0..5 {
                tokio::time::sleep(Duration::from_millis(5)).await;
                writer.increment();
            }
        });
        assert!(tracker.wait_for(5, Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn wait_for_times_out() {
        let tracker = UploadTracker::new();
        assert!(!tracker.wait_for(1, Duration::from_millis(50)).await);
    }
}
