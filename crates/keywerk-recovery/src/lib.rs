// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// keywerk-recovery — The password recovery engine.
//
// Generates candidates from a dictionary or brute-force strategy, slices them
// into batches, checks batches concurrently against a `PasswordOracle`, and
// reports progress until the password is found, the space is exhausted, the
// document faults, or the caller cancels.

pub mod cancel;
pub mod candidates;
pub mod controller;
pub mod dispatcher;
pub mod progress;

// Re-export the primary structs so callers can use `keywerk_recovery::RecoveryController` etc.
pub use cancel::CancelToken;
pub use candidates::CandidateSource;
pub use controller::{RecoveryController, RecoveryHandle};
pub use dispatcher::{Batch, BatchReport, check_batch};
