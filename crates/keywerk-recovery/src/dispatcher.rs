// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch dispatch — slices the candidate stream into fixed-size batches and
// checks one batch on a worker.
//
// Workers never talk to each other. The only state they share is `SharedState`:
// a write-once winner slot and one word holding the halt flag and the attempt
// counter.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use keywerk_core::error::KeywerkError;
use keywerk_core::oracle::PasswordOracle;
use keywerk_core::types::{AttemptOutcome, Candidate};
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::candidates::CandidateSource;

/// A contiguous slice of the search stream, checked by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 0-based position of this batch in the stream.
    pub index: u64,
    pub candidates: Vec<Candidate>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// What a worker reports back for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub index: u64,
    /// Oracle calls actually made for this batch.
    pub attempts: u64,
    pub outcome: AttemptOutcome,
}

// ---------------------------------------------------------------------------
// Batching
// ---------------------------------------------------------------------------

/// Lazily groups a candidate stream into batches of at most `size`.
#[derive(Debug)]
pub struct Batches<I> {
    candidates: I,
    size: usize,
    next_index: u64,
}

impl<I: Iterator<Item = Candidate>> Batches<I> {
    pub fn new(candidates: I, size: usize) -> Self {
        Self {
            candidates,
            size: size.max(1),
            next_index: 0,
        }
    }
}

impl<I: Iterator<Item = Candidate>> Iterator for Batches<I> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let candidates: Vec<Candidate> = self.candidates.by_ref().take(self.size).collect();
        if candidates.is_empty() {
            return None;
        }
        let batch = Batch {
            index: self.next_index,
            candidates,
        };
        self.next_index += 1;
        Some(batch)
    }
}

impl CandidateSource {
    /// Batches over the search stream (the empty probe is not batched).
    pub fn batches(&self, size: usize) -> Batches<crate::candidates::Candidates> {
        Batches::new(self.search_candidates(), size)
    }

    /// Recompute batch `index` directly, without generating earlier batches.
    pub fn batch_at(&self, index: u64, size: usize) -> Option<Batch> {
        let size = size.max(1);
        let offset = index.checked_mul(size as u64)?;
        let candidates: Vec<Candidate> = self.search_candidates_from(offset).take(size).collect();
        if candidates.is_empty() {
            None
        } else {
            Some(Batch { index, candidates })
        }
    }
}

/// Number of batches needed for `candidates` search candidates.
pub fn batch_count(candidates: Option<u64>, size: usize) -> Option<u64> {
    candidates.map(|count| count.div_ceil(size.max(1) as u64))
}

// ---------------------------------------------------------------------------
// Checking
// ---------------------------------------------------------------------------

/// Try each candidate of `batch` in order, stopping at the first success.
///
/// `may_try` is asked before every oracle call; once it answers false the
/// batch stops, so at most the call already in progress completes. A wrong
/// password is absorbed; an oracle fault ends the batch with
/// `AttemptOutcome::OracleFault`.
pub fn check_batch<F>(oracle: &dyn PasswordOracle, batch: &Batch, mut may_try: F) -> BatchReport
where
    F: FnMut() -> bool,
{
    let mut attempts = 0u64;
    let outcome = 'search: {
        for candidate in &batch.candidates {
            if !may_try() {
                break 'search AttemptOutcome::Cancelled;
            }
            attempts += 1;
            match oracle.try_open(candidate) {
                Ok(true) => break 'search AttemptOutcome::Success(candidate.clone()),
                Ok(false) => {}
                Err(err) => break 'search AttemptOutcome::OracleFault(fault_reason(err)),
            }
        }
        AttemptOutcome::Exhausted
    };

    BatchReport {
        index: batch.index,
        attempts,
        outcome,
    }
}

fn fault_reason(err: KeywerkError) -> String {
    match err {
        KeywerkError::OracleFault(reason) => reason,
        other => other.to_string(),
    }
}

/// Top bit of `SharedState::ledger`; the low bits count oracle calls.
const HALTED: u64 = 1 << 63;

/// State shared by every worker of one recovery attempt.
///
/// The attempt counter and the halt flag live in one atomic word. A worker
/// reserves a count before each oracle call and the reservation fails once
/// the word is halted, so the count frozen by [`SharedState::halt`] is exactly
/// the number of oracle calls the attempt makes.
#[derive(Debug, Default)]
pub struct SharedState {
    winner: OnceLock<Candidate>,
    ledger: AtomicU64,
    cancel: CancelToken,
}

impl SharedState {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            cancel,
            ..Default::default()
        }
    }

    /// Record a success. Only the first commit wins; later ones return false.
    pub fn commit(&self, candidate: &str) -> bool {
        self.winner.set(candidate.to_owned()).is_ok()
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.get().map(String::as_str)
    }

    /// Count one oracle call, unless the attempt is over.
    pub fn try_reserve(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.ledger
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                (word & HALTED == 0).then_some(word + 1)
            })
            .is_ok()
    }

    /// Stop every worker before its next candidate and freeze the count.
    /// Returns the final number of oracle calls.
    pub fn halt(&self) -> u64 {
        self.ledger.fetch_or(HALTED, Ordering::AcqRel) & !HALTED
    }

    pub fn is_halted(&self) -> bool {
        self.ledger.load(Ordering::Acquire) & HALTED != 0 || self.cancel.is_cancelled()
    }

    /// Count calls made outside a batch (the empty probe).
    pub fn add_attempts(&self, attempts: u64) {
        self.ledger.fetch_add(attempts, Ordering::AcqRel);
    }

    pub fn attempts(&self) -> u64 {
        self.ledger.load(Ordering::Acquire) & !HALTED
    }
}

/// Worker body: check one batch and publish its effect on the shared state.
pub fn run_batch(oracle: &dyn PasswordOracle, batch: &Batch, shared: &SharedState) -> BatchReport {
    let mut report = check_batch(oracle, batch, || shared.try_reserve());

    match &report.outcome {
        AttemptOutcome::Success(candidate) => {
            if shared.commit(candidate) {
                shared.halt();
                debug!(batch = batch.index, "batch found the password");
            } else {
                // Only possible with duplicate candidates: someone else won.
                debug!(batch = batch.index, "redundant success discarded");
                report.outcome = AttemptOutcome::Cancelled;
            }
        }
        AttemptOutcome::OracleFault(reason) => {
            warn!(batch = batch.index, %reason, "oracle fault, halting workers");
            shared.halt();
        }
        AttemptOutcome::Exhausted | AttemptOutcome::Cancelled => {}
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use keywerk_core::error::Result;
    use keywerk_core::types::{Charset, Strategy};

    /// Records every candidate it is asked about.
    struct Recorder {
        secret: &'static str,
        seen: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new(secret: &'static str) -> Self {
            Self {
                secret,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl PasswordOracle for Recorder {
        fn try_open(&self, candidate: &str) -> Result<bool> {
            self.seen.lock().unwrap().push(candidate.to_owned());
            Ok(candidate == self.secret)
        }
    }

    fn batch(words: &[&str]) -> Batch {
        Batch {
            index: 0,
            candidates: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    fn brute(chars: &str, max_length: usize) -> CandidateSource {
        CandidateSource::new(Strategy::BruteForce {
            charset: Charset::new(chars),
            max_length,
        })
    }

    #[test]
    fn batches_partition_the_stream() {
        let source = brute("abc", 3);
        let batches: Vec<Batch> = source.batches(10).collect();
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[3].len(), 9);

        let flattened: Vec<Candidate> = batches.into_iter().flat_map(|b| b.candidates).collect();
        let sequential: Vec<Candidate> = source.search_candidates().collect();
        assert_eq!(flattened, sequential);
        assert_eq!(batch_count(source.search_space(), 10), Some(4));
    }

    #[test]
    fn batch_at_matches_sequential_batching() {
        let source = brute("0123", 3);
        for (k, expected) in source.batches(7).enumerate() {
            assert_eq!(source.batch_at(k as u64, 7), Some(expected));
        }
        assert_eq!(source.batch_at(100, 7), None);
    }

    #[test]
    fn check_stops_at_first_success() {
        let oracle = Recorder::new("b");
        let report = check_batch(&oracle, &batch(&["a", "b", "c"]), || true);
        assert_eq!(report.outcome, AttemptOutcome::Success("b".into()));
        assert_eq!(report.attempts, 2);
        assert_eq!(oracle.seen(), vec!["a", "b"]);
    }

    #[test]
    fn check_exhausts_without_match() {
        let oracle = Recorder::new("zzz");
        let report = check_batch(&oracle, &batch(&["a", "b", "c"]), || true);
        assert_eq!(report.outcome, AttemptOutcome::Exhausted);
        assert_eq!(report.attempts, 3);
    }

    #[test]
    fn check_observes_halt_between_candidates() {
        let oracle = Recorder::new("zzz");
        let report = check_batch(&oracle, &batch(&["a", "b"]), || false);
        assert_eq!(report.outcome, AttemptOutcome::Cancelled);
        assert_eq!(report.attempts, 0);
        assert!(oracle.seen().is_empty());
    }

    #[test]
    fn check_surfaces_faults() {
        let oracle =
            |_: &str| -> Result<bool> { Err(KeywerkError::OracleFault("unreadable".into())) };
        let report = check_batch(&oracle, &batch(&["a", "b"]), || true);
        assert_eq!(
            report.outcome,
            AttemptOutcome::OracleFault("unreadable".into())
        );
        assert_eq!(report.attempts, 1);
    }

    #[test]
    fn only_first_commit_wins() {
        let shared = SharedState::default();
        let oracle = Recorder::new("dup");
        let first = run_batch(&oracle, &batch(&["dup"]), &shared);
        let second = run_batch(&oracle, &batch(&["dup"]), &shared);

        assert_eq!(first.outcome, AttemptOutcome::Success("dup".into()));
        // The halt set by the first winner stops the second batch outright.
        assert_eq!(second.outcome, AttemptOutcome::Cancelled);
        assert_eq!(shared.winner(), Some("dup"));
        assert_eq!(shared.attempts(), 1);
    }

    #[test]
    fn late_duplicate_success_is_redundant() {
        let shared = SharedState::default();
        assert!(shared.commit("dup"));
        // A worker that was already past its halt check still reports a hit.
        let oracle = Recorder::new("dup");
        let mut report = check_batch(&oracle, &batch(&["dup"]), || true);
        if let AttemptOutcome::Success(candidate) = &report.outcome {
            if !shared.commit(candidate) {
                report.outcome = AttemptOutcome::Cancelled;
            }
        }
        assert_eq!(report.outcome, AttemptOutcome::Cancelled);
    }

    #[test]
    fn external_cancel_halts_workers() {
        let token = CancelToken::new();
        let shared = SharedState::new(token.clone());
        assert!(!shared.is_halted());
        token.cancel();
        assert!(shared.is_halted());
        assert!(!shared.try_reserve());
    }

    #[test]
    fn halt_freezes_the_attempt_count() {
        let shared = SharedState::default();
        shared.add_attempts(1);
        assert!(shared.try_reserve());
        assert!(shared.try_reserve());
        assert_eq!(shared.halt(), 3);

        assert!(shared.is_halted());
        assert!(!shared.try_reserve());
        assert_eq!(shared.attempts(), 3);
        // Halting twice reports the same count.
        assert_eq!(shared.halt(), 3);
    }

    #[test]
    fn shared_count_matches_oracle_calls() {
        let shared = SharedState::default();
        let oracle = Recorder::new("zzz");
        run_batch(&oracle, &batch(&["a", "b", "c"]), &shared);
        run_batch(&oracle, &batch(&["d", "e"]), &shared);
        assert_eq!(shared.attempts(), 5);
        assert_eq!(oracle.seen().len(), 5);
    }

    #[test]
    fn check_asks_before_every_call() {
        let oracle = Recorder::new("zzz");
        let mut budget = 2;
        let report = check_batch(&oracle, &batch(&["a", "b", "c"]), || {
            budget -= 1;
            budget >= 0
        });
        assert_eq!(report.outcome, AttemptOutcome::Cancelled);
        assert_eq!(report.attempts, 2);
        assert_eq!(oracle.seen(), vec!["a", "b"]);
    }
}
