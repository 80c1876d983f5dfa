// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Keywerk recovery engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One password to test. May be empty (the "no user password" probe).
pub type Candidate = String;

/// Unique identifier for a recovery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecoveryId(pub Uuid);

impl RecoveryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecoveryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecoveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Charset
// ---------------------------------------------------------------------------

/// ASCII digits, in the order brute force enumerates them.
pub const DIGITS: &str = "0123456789";
/// ASCII lowercase letters.
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
/// ASCII uppercase letters.
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// ASCII punctuation.
pub const SYMBOLS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// An ordered set of characters used by brute-force enumeration.
///
/// Iteration order is insertion order; repeated characters are dropped so the
/// generated candidates never repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Charset(Vec<char>);

impl Charset {
    pub fn new(chars: &str) -> Self {
        let mut set: Vec<char> = Vec::with_capacity(chars.len());
        for ch in chars.chars() {
            if !set.contains(&ch) {
                set.push(ch);
            }
        }
        Self(set)
    }

    /// Build a charset from the usual character classes, in the fixed order
    /// digits, lowercase, uppercase, symbols.
    pub fn from_classes(digits: bool, lowercase: bool, uppercase: bool, symbols: bool) -> Self {
        let mut chars = String::new();
        for (enabled, class) in [
            (digits, DIGITS),
            (lowercase, LOWERCASE),
            (uppercase, UPPERCASE),
            (symbols, SYMBOLS),
        ] {
            if enabled {
                chars.push_str(class);
            }
        }
        Self::new(&chars)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.0
    }
}

impl From<&str> for Charset {
    fn from(chars: &str) -> Self {
        Self::new(chars)
    }
}

impl From<String> for Charset {
    fn from(chars: String) -> Self {
        Self::new(&chars)
    }
}

impl From<Charset> for String {
    fn from(charset: Charset) -> Self {
        charset.0.into_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How candidates are produced for one recovery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Try custom words (in file order) followed, optionally, by the built-in
    /// list of common weak passwords.
    Dictionary {
        words: Vec<Candidate>,
        include_common_defaults: bool,
    },
    /// Try every string over `charset` of length 1 up to `max_length`.
    BruteForce { charset: Charset, max_length: usize },
}

impl Strategy {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dictionary { .. } => "dictionary",
            Self::BruteForce { .. } => "brute-force",
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What one batch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The oracle accepted this candidate.
    Success(Candidate),
    /// Every candidate in the batch was rejected.
    Exhausted,
    /// The batch stopped early because the attempt is over elsewhere.
    Cancelled,
    /// The oracle could not evaluate the document at all.
    OracleFault(String),
}

/// Final answer of a recovery attempt that ran to completion.
///
/// Faults and cancellation are reported as `KeywerkError::OracleFault` and
/// `KeywerkError::Cancelled` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryResult {
    Found {
        password: Candidate,
        elapsed: Duration,
        attempts_tried: u64,
    },
    NotFound {
        attempts_tried: u64,
        elapsed: Duration,
    },
}

impl RecoveryResult {
    pub fn password(&self) -> Option<&str> {
        match self {
            Self::Found { password, .. } => Some(password),
            Self::NotFound { .. } => None,
        }
    }

    pub fn attempts_tried(&self) -> u64 {
        match self {
            Self::Found { attempts_tried, .. } | Self::NotFound { attempts_tried, .. } => {
                *attempts_tried
            }
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Found { elapsed, .. } | Self::NotFound { elapsed, .. } => *elapsed,
        }
    }

    /// The document opened with the empty password: it only carries owner
    /// (permission) restrictions, no user password.
    pub fn is_owner_restriction_only(&self) -> bool {
        self.password() == Some("")
    }
}

// ---------------------------------------------------------------------------
// Progress and lifecycle
// ---------------------------------------------------------------------------

/// Point-in-time view of a running attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub completed_batches: u64,
    /// `None` when the candidate space is too large to count.
    pub total_batches: Option<u64>,
    pub candidates_tried: u64,
    /// Size of the whole candidate stream, empty probe included.
    pub total_candidates: Option<u64>,
    pub rate_per_second: f64,
}

impl ProgressSnapshot {
    /// Fraction of the candidate space covered, in `[0, 1]`.
    pub fn fraction(&self) -> Option<f64> {
        match self.total_candidates {
            Some(0) => Some(1.0),
            Some(total) => Some((self.candidates_tried as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

/// Lifecycle of a recovery attempt.
///
/// `Idle → EmptyProbe → Running → {Found, NotFound, Faulted, Cancelled}`.
/// The empty probe can also end the attempt directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryState {
    Idle,
    EmptyProbe,
    Running,
    Found,
    NotFound,
    Faulted,
    Cancelled,
}

impl RecoveryState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Found | Self::NotFound | Self::Faulted | Self::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_drops_repeats_and_keeps_order() {
        let charset = Charset::new("abca1b");
        assert_eq!(charset.chars(), &['a', 'b', 'c', '1']);
    }

    #[test]
    fn charset_classes_follow_fixed_order() {
        let charset = Charset::from_classes(true, true, false, false);
        assert_eq!(charset.len(), 36);
        assert_eq!(charset.chars()[0], '0');
        assert_eq!(charset.chars()[10], 'a');
        assert!(Charset::from_classes(false, false, false, false).is_empty());
    }

    #[test]
    fn symbols_match_ascii_punctuation() {
        assert_eq!(SYMBOLS.len(), 32);
        assert!(SYMBOLS.chars().all(|c| c.is_ascii_punctuation()));
    }

    #[test]
    fn charset_serializes_as_string() {
        let json = serde_json::to_string(&Charset::new("01")).unwrap();
        assert_eq!(json, "\"01\"");
        let back: Charset = serde_json::from_str("\"0011\"").unwrap();
        assert_eq!(back, Charset::new("01"));
    }

    #[test]
    fn empty_password_means_owner_restriction() {
        let result = RecoveryResult::Found {
            password: String::new(),
            elapsed: Duration::ZERO,
            attempts_tried: 1,
        };
        assert!(result.is_owner_restriction_only());
        assert_eq!(result.attempts_tried(), 1);
    }

    #[test]
    fn progress_fraction_handles_unknown_total() {
        let mut snapshot = ProgressSnapshot {
            candidates_tried: 5,
            total_candidates: Some(10),
            ..Default::default()
        };
        assert_eq!(snapshot.fraction(), Some(0.5));
        snapshot.total_candidates = None;
        assert_eq!(snapshot.fraction(), None);
    }

    #[test]
    fn terminal_states() {
        assert!(!RecoveryState::Running.is_terminal());
        assert!(RecoveryState::Cancelled.is_terminal());
    }
}
