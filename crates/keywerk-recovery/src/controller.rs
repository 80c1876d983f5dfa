// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recovery controller — runs one recovery attempt end to end.
//
// The empty password is probed inline before anything else. If it fails, a
// Tokio task keeps up to `pool_size` batches in flight on the blocking pool,
// pulls the next batch only when a slot frees up, and handles completions in
// the order they finish. The first success, the first oracle fault, or an
// external cancel ends the attempt; batches still running are abandoned and
// stop at their next halt check.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use keywerk_core::config::RecoveryConfig;
use keywerk_core::error::{KeywerkError, Result};
use keywerk_core::oracle::PasswordOracle;
use keywerk_core::types::{
    AttemptOutcome, Candidate, ProgressSnapshot, RecoveryId, RecoveryResult, RecoveryState,
    Strategy,
};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, instrument, warn};

use crate::cancel::CancelToken;
use crate::candidates::CandidateSource;
use crate::dispatcher::{BatchReport, SharedState, batch_count, run_batch};
use crate::progress::ProgressTracker;

/// Starts recovery attempts with a fixed configuration.
#[derive(Debug, Clone)]
pub struct RecoveryController {
    config: RecoveryConfig,
}

impl RecoveryController {
    pub fn new(config: RecoveryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Start a recovery attempt.
    ///
    /// The strategy is validated and the empty password is tried before this
    /// returns, so an invalid strategy is reported here and an owner-only
    /// document resolves without starting any workers. Otherwise the search
    /// continues on a spawned task; must be called inside a Tokio runtime.
    ///
    /// The empty-password check is one blocking oracle call on the caller's
    /// thread. From an async context with a slow oracle, call this via
    /// `tokio::task::spawn_blocking` or accept one call's worth of blocking.
    #[instrument(skip_all, fields(
        strategy = strategy.kind(),
        pool_size = self.config.pool_size,
        batch_size = self.config.batch_size
    ))]
    pub fn start(
        &self,
        strategy: Strategy,
        oracle: Arc<dyn PasswordOracle>,
    ) -> Result<RecoveryHandle> {
        let source = CandidateSource::new(strategy);
        source.validate()?;

        let id = RecoveryId::new();
        let started_at = Utc::now();
        let started = Instant::now();
        let search_space = source.search_space();
        let (mut progress, progress_rx) = ProgressTracker::new(
            started,
            batch_count(search_space, self.config.batch_size),
            source.total(),
        );
        let (state_tx, state_rx) = watch::channel(RecoveryState::Idle);
        let cancel = CancelToken::new();

        info!(%id, ?search_space, "recovery started");

        transition(&state_tx, RecoveryState::EmptyProbe);
        let probe = oracle.try_open("");
        progress.record_attempts(1);

        let completion = match probe {
            Ok(true) => {
                info!(%id, "empty password accepted: owner restrictions only");
                transition(&state_tx, RecoveryState::Found);
                Completion::Ready(Ok(RecoveryResult::Found {
                    password: Candidate::new(),
                    elapsed: started.elapsed(),
                    attempts_tried: 1,
                }))
            }
            Err(err) => {
                let reason = match err {
                    KeywerkError::OracleFault(reason) => reason,
                    other => other.to_string(),
                };
                warn!(%id, %reason, "document cannot be evaluated");
                transition(&state_tx, RecoveryState::Faulted);
                Completion::Ready(Err(KeywerkError::OracleFault(reason)))
            }
            Ok(false) => {
                let shared = Arc::new(SharedState::new(cancel.clone()));
                shared.add_attempts(1);
                transition(&state_tx, RecoveryState::Running);
                let run = Run {
                    id,
                    config: self.config.clone(),
                    source,
                    oracle,
                    shared,
                    cancel: cancel.clone(),
                    progress,
                    state: state_tx,
                    started,
                };
                Completion::Running(tokio::spawn(run.execute()))
            }
        };

        Ok(RecoveryHandle {
            id,
            started_at,
            progress: progress_rx,
            state: state_rx,
            cancel,
            completion,
        })
    }

    /// Start an attempt and wait for its result.
    pub async fn run(
        &self,
        strategy: Strategy,
        oracle: Arc<dyn PasswordOracle>,
    ) -> Result<RecoveryResult> {
        self.start(strategy, oracle)?.await_result().await
    }
}

fn transition(state: &watch::Sender<RecoveryState>, next: RecoveryState) {
    let previous = state.send_replace(next);
    debug!(?previous, ?next, "recovery state changed");
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Completion {
    Ready(Result<RecoveryResult>),
    Running(JoinHandle<Result<RecoveryResult>>),
}

/// Owns one recovery attempt: its progress, state, cancellation, and result.
///
/// Dropping the handle detaches the attempt; call [`RecoveryHandle::cancel`]
/// first to stop it.
#[derive(Debug)]
pub struct RecoveryHandle {
    id: RecoveryId,
    started_at: DateTime<Utc>,
    progress: watch::Receiver<ProgressSnapshot>,
    state: watch::Receiver<RecoveryState>,
    cancel: CancelToken,
    completion: Completion,
}

impl RecoveryHandle {
    pub fn id(&self) -> RecoveryId {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Latest progress snapshot. Never blocks.
    pub fn progress(&self) -> ProgressSnapshot {
        *self.progress.borrow()
    }

    /// A receiver that is notified whenever progress changes.
    pub fn subscribe_progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.clone()
    }

    pub fn state(&self) -> RecoveryState {
        *self.state.borrow()
    }

    /// Request cancellation. No new batches are scheduled once the controller
    /// observes it; running batches stop before their next candidate.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The token behind [`RecoveryHandle::cancel`], for wiring up deadlines.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        match &self.completion {
            Completion::Ready(_) => true,
            Completion::Running(task) => task.is_finished(),
        }
    }

    /// Wait for the attempt to end.
    ///
    /// `Ok` carries `Found` or `NotFound`; a faulted attempt is
    /// `Err(KeywerkError::OracleFault)` and a cancelled one
    /// `Err(KeywerkError::Cancelled)`.
    pub async fn await_result(self) -> Result<RecoveryResult> {
        match self.completion {
            Completion::Ready(result) => result,
            Completion::Running(task) => task
                .await
                .map_err(|err| KeywerkError::RecoveryTask(err.to_string()))?,
        }
    }
}

// ---------------------------------------------------------------------------
// Running attempt
// ---------------------------------------------------------------------------

struct Run {
    id: RecoveryId,
    config: RecoveryConfig,
    source: CandidateSource,
    oracle: Arc<dyn PasswordOracle>,
    shared: Arc<SharedState>,
    cancel: CancelToken,
    progress: ProgressTracker,
    state: watch::Sender<RecoveryState>,
    started: Instant,
}

impl Run {
    async fn execute(mut self) -> Result<RecoveryResult> {
        let mut batches = self.source.batches(self.config.batch_size);
        let mut in_flight: JoinSet<BatchReport> = JoinSet::new();

        loop {
            while in_flight.len() < self.config.pool_size && !self.shared.is_halted() {
                let Some(batch) = batches.next() else {
                    break;
                };
                let oracle = Arc::clone(&self.oracle);
                let shared = Arc::clone(&self.shared);
                in_flight.spawn_blocking(move || run_batch(&*oracle, &batch, &shared));
            }

            if in_flight.is_empty() {
                if self.cancel.is_cancelled() {
                    return Err(self.cancelled());
                }
                return Ok(self.not_found());
            }

            let joined = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.cancelled()),
                joined = in_flight.join_next() => joined,
            };

            let report = match joined {
                Some(Ok(report)) => report,
                Some(Err(err)) => {
                    self.shared.halt();
                    transition(&self.state, RecoveryState::Faulted);
                    return Err(KeywerkError::RecoveryTask(format!("batch worker: {err}")));
                }
                None => continue,
            };

            self.progress.record_batch(self.shared.attempts());
            debug!(
                batch = report.index,
                attempts = report.attempts,
                outcome = outcome_label(&report.outcome),
                "batch completed"
            );

            match report.outcome {
                AttemptOutcome::Success(password) => return Ok(self.found(password)),
                AttemptOutcome::OracleFault(reason) => return Err(self.faulted(reason)),
                AttemptOutcome::Exhausted | AttemptOutcome::Cancelled => {}
            }
        }
    }

    fn found(&mut self, password: Candidate) -> RecoveryResult {
        let attempts_tried = self.shared.halt();
        let elapsed = self.started.elapsed();
        info!(
            id = %self.id,
            attempts_tried,
            password_len = password.chars().count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "password found"
        );
        transition(&self.state, RecoveryState::Found);
        RecoveryResult::Found {
            password,
            elapsed,
            attempts_tried,
        }
    }

    fn not_found(&mut self) -> RecoveryResult {
        let attempts_tried = self.shared.attempts();
        let elapsed = self.started.elapsed();
        info!(id = %self.id, attempts_tried, "search space exhausted");
        transition(&self.state, RecoveryState::NotFound);
        RecoveryResult::NotFound {
            attempts_tried,
            elapsed,
        }
    }

    fn faulted(&mut self, reason: String) -> KeywerkError {
        self.shared.halt();
        warn!(id = %self.id, %reason, "oracle fault, abandoning recovery");
        transition(&self.state, RecoveryState::Faulted);
        KeywerkError::OracleFault(reason)
    }

    fn cancelled(&mut self) -> KeywerkError {
        let attempts_tried = self.shared.halt();
        info!(id = %self.id, attempts_tried, "recovery cancelled");
        transition(&self.state, RecoveryState::Cancelled);
        KeywerkError::Cancelled {
            attempts_tried,
            elapsed: self.started.elapsed(),
        }
    }
}

fn outcome_label(outcome: &AttemptOutcome) -> &'static str {
    match outcome {
        AttemptOutcome::Success(_) => "success",
        AttemptOutcome::Exhausted => "exhausted",
        AttemptOutcome::Cancelled => "cancelled",
        AttemptOutcome::OracleFault(_) => "fault",
    }
}
