// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress model — batch completions in, snapshots out.

use std::time::{Duration, Instant};

use keywerk_core::types::ProgressSnapshot;
use tokio::sync::watch;

/// Candidates per second, or 0 before any time has passed.
pub fn rate_per_second(candidates_tried: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        candidates_tried as f64 / secs
    } else {
        0.0
    }
}

/// Publishes a fresh `ProgressSnapshot` after every batch completion.
///
/// Publishing never blocks; readers see the most recent snapshot whenever
/// they look.
pub struct ProgressTracker {
    started: Instant,
    snapshot: ProgressSnapshot,
    sender: watch::Sender<ProgressSnapshot>,
}

impl ProgressTracker {
    pub fn new(
        started: Instant,
        total_batches: Option<u64>,
        total_candidates: Option<u64>,
    ) -> (Self, watch::Receiver<ProgressSnapshot>) {
        let snapshot = ProgressSnapshot {
            total_batches,
            total_candidates,
            ..Default::default()
        };
        let (sender, receiver) = watch::channel(snapshot);
        (
            Self {
                started,
                snapshot,
                sender,
            },
            receiver,
        )
    }

    /// Record the attempt count without a batch completing (the empty probe).
    pub fn record_attempts(&mut self, candidates_tried: u64) {
        self.snapshot.candidates_tried = candidates_tried;
        self.publish();
    }

    /// Record one finished batch. `candidates_tried` is the running total.
    pub fn record_batch(&mut self, candidates_tried: u64) {
        self.snapshot.completed_batches += 1;
        self.snapshot.candidates_tried = candidates_tried;
        self.publish();
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn publish(&mut self) {
        self.snapshot.rate_per_second =
            rate_per_second(self.snapshot.candidates_tried, self.elapsed());
        self.sender.send_replace(self.snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_zero_without_elapsed_time() {
        assert_eq!(rate_per_second(100, Duration::ZERO), 0.0);
        assert_eq!(rate_per_second(100, Duration::from_secs(4)), 25.0);
    }

    #[test]
    fn batches_accumulate_in_snapshots() {
        let (mut tracker, receiver) = ProgressTracker::new(Instant::now(), Some(3), Some(120));
        tracker.record_attempts(1);
        tracker.record_batch(51);
        tracker.record_batch(101);

        let seen = *receiver.borrow();
        assert_eq!(seen.completed_batches, 2);
        assert_eq!(seen.candidates_tried, 101);
        assert_eq!(seen.total_batches, Some(3));
        assert!(seen.rate_per_second >= 0.0);
        assert_eq!(seen, tracker.snapshot());
    }

    #[test]
    fn publishing_survives_dropped_readers() {
        let (mut tracker, receiver) = ProgressTracker::new(Instant::now(), None, None);
        drop(receiver);
        tracker.record_batch(10);
        assert_eq!(tracker.snapshot().completed_batches, 1);
    }
}
