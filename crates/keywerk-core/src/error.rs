// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Keywerk.
//
// A wrong password is not an error: the oracle answers `Ok(false)` and the
// search moves on. Everything here ends a recovery attempt.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all Keywerk operations.
#[derive(Debug, Error)]
pub enum KeywerkError {
    // -- Attempt setup --
    #[error("invalid strategy: {0}")]
    InvalidStrategy(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Attempt termination --
    #[error("document cannot be evaluated: {0}")]
    OracleFault(String),

    #[error("recovery cancelled after {attempts_tried} attempts")]
    Cancelled {
        attempts_tried: u64,
        elapsed: Duration,
    },

    #[error("recovery task failed: {0}")]
    RecoveryTask(String),

    // -- Document / input errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("wordlist could not be read: {0}")]
    Wordlist(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KeywerkError {
    /// Whether this error is the terminal state of an attempt that ran (as
    /// opposed to one that was rejected before any work was scheduled).
    pub fn is_terminal_state(&self) -> bool {
        matches!(self, Self::OracleFault(_) | Self::Cancelled { .. })
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KeywerkError>;
