// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Candidate generation — turns a `Strategy` into a deterministic, lazy stream
// of passwords to try.
//
// The full stream always starts with the empty password. Dictionary streams
// are small and materialised; brute-force streams are exponential in the
// maximum length and are only ever produced one candidate at a time. Both can
// be resumed at any index, so batches can be recomputed without replaying the
// candidates before them.

use std::iter;

use keywerk_core::error::{KeywerkError, Result};
use keywerk_core::types::{Candidate, Strategy};

/// Well-known weak passwords, tried after any custom words.
pub const COMMON_PASSWORDS: &[&str] = &[
    "123456",
    "password",
    "1234",
    "12345",
    "12345678",
    "123456789",
    "1234567890",
    "000000",
    "111111",
    "password123",
    "admin",
    "root",
    "user",
    "pdf",
    "document",
    "master",
    "0000",
    "1234567",
    "123123",
];

/// Calendar years appended to the common list.
pub const COMMON_YEARS: std::ops::RangeInclusive<u32> = 1980..=2029;

/// The built-in common list, in the order it is tried.
pub fn common_defaults() -> impl Iterator<Item = Candidate> {
    COMMON_PASSWORDS
        .iter()
        .map(|word| (*word).to_owned())
        .chain(COMMON_YEARS.map(|year| year.to_string()))
}

/// Custom dictionary words, minus the empty password: it is always tried
/// first and never repeated.
fn custom_words(words: &[Candidate]) -> impl Iterator<Item = &Candidate> {
    words.iter().filter(|word| !word.is_empty())
}

/// Number of strings of length `1..=max_length` over an alphabet of
/// `charset_len` characters, or `None` if it does not fit in a `u64`.
pub fn brute_force_space(charset_len: usize, max_length: usize) -> Option<u64> {
    let base = u64::try_from(charset_len).ok()?;
    let mut total: u64 = 0;
    for length in 1..=max_length {
        let exponent = u32::try_from(length).ok()?;
        total = total.checked_add(base.checked_pow(exponent)?)?;
    }
    Some(total)
}

// ---------------------------------------------------------------------------
// CandidateSource
// ---------------------------------------------------------------------------

/// Produces the candidate stream for one recovery attempt.
#[derive(Debug, Clone)]
pub struct CandidateSource {
    strategy: Strategy,
}

impl CandidateSource {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Reject strategies that cannot produce anything beyond the empty probe.
    pub fn validate(&self) -> Result<()> {
        match &self.strategy {
            Strategy::Dictionary {
                words,
                include_common_defaults,
            } => {
                if custom_words(words).next().is_none() && !include_common_defaults {
                    return Err(KeywerkError::InvalidStrategy(
                        "dictionary has no words and the common list is disabled".into(),
                    ));
                }
            }
            Strategy::BruteForce {
                charset,
                max_length,
            } => {
                if charset.is_empty() {
                    return Err(KeywerkError::InvalidStrategy(
                        "brute-force charset is empty".into(),
                    ));
                }
                if *max_length == 0 {
                    return Err(KeywerkError::InvalidStrategy(
                        "brute-force max_length must be at least 1".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Size of the search space, excluding the empty probe. `None` when it is
    /// too large to count.
    pub fn search_space(&self) -> Option<u64> {
        match &self.strategy {
            Strategy::Dictionary {
                words,
                include_common_defaults,
            } => {
                let defaults = if *include_common_defaults {
                    common_defaults().count()
                } else {
                    0
                };
                u64::try_from(custom_words(words).count() + defaults).ok()
            }
            Strategy::BruteForce {
                charset,
                max_length,
            } => brute_force_space(charset.len(), *max_length),
        }
    }

    /// Size of the full stream, empty probe included.
    pub fn total(&self) -> Option<u64> {
        self.search_space()?.checked_add(1)
    }

    /// The full stream: the empty probe followed by the search candidates.
    pub fn iter(&self) -> impl Iterator<Item = Candidate> + use<> {
        iter::once(String::new()).chain(self.search_candidates())
    }

    /// Strategy-specific candidates, without the empty probe.
    pub fn search_candidates(&self) -> Candidates {
        self.search_candidates_from(0)
    }

    /// Strategy-specific candidates starting at `offset` (0-based, empty probe
    /// not counted).
    pub fn search_candidates_from(&self, offset: u64) -> Candidates {
        match &self.strategy {
            Strategy::Dictionary {
                words,
                include_common_defaults,
            } => {
                let mut list: Vec<Candidate> = custom_words(words).cloned().collect();
                if *include_common_defaults {
                    list.extend(common_defaults());
                }
                let skip = usize::try_from(offset).unwrap_or(usize::MAX).min(list.len());
                list.drain(..skip);
                Candidates::Words(list.into_iter())
            }
            Strategy::BruteForce {
                charset,
                max_length,
            } => Candidates::BruteForce(BruteForceCandidates::starting_at(
                charset.chars().to_vec(),
                *max_length,
                offset,
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Iterators
// ---------------------------------------------------------------------------

/// Lazy stream of search candidates.
#[derive(Debug)]
pub enum Candidates {
    Words(std::vec::IntoIter<Candidate>),
    BruteForce(BruteForceCandidates),
}

impl Iterator for Candidates {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        match self {
            Self::Words(words) => words.next(),
            Self::BruteForce(brute) => brute.next(),
        }
    }
}

/// Enumerates every string over a charset by increasing length; within one
/// length the leftmost character varies slowest.
///
/// The state is a single odometer of charset indices, so memory use is
/// independent of how many candidates have been produced.
#[derive(Debug, Clone)]
pub struct BruteForceCandidates {
    charset: Vec<char>,
    max_length: usize,
    /// Charset indices of the next candidate. Empty once exhausted.
    odometer: Vec<usize>,
}

impl BruteForceCandidates {
    pub fn new(charset: Vec<char>, max_length: usize) -> Self {
        Self::starting_at(charset, max_length, 0)
    }

    /// Position the odometer at the `index`-th candidate (0-based).
    pub fn starting_at(charset: Vec<char>, max_length: usize, index: u64) -> Self {
        let odometer = odometer_at(charset.len(), max_length, index).unwrap_or_default();
        Self {
            charset,
            max_length,
            odometer,
        }
    }

    fn advance(&mut self) {
        let base = self.charset.len();
        for position in (0..self.odometer.len()).rev() {
            self.odometer[position] += 1;
            if self.odometer[position] < base {
                return;
            }
            self.odometer[position] = 0;
        }
        // Every position rolled over: move on to the next length.
        let next_length = self.odometer.len() + 1;
        if next_length > self.max_length {
            self.odometer.clear();
        } else {
            self.odometer = vec![0; next_length];
        }
    }
}

impl Iterator for BruteForceCandidates {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.odometer.is_empty() {
            return None;
        }
        let candidate: Candidate = self.odometer.iter().map(|&i| self.charset[i]).collect();
        self.advance();
        Some(candidate)
    }
}

/// Decode a 0-based candidate index into odometer digits, or `None` if the
/// index is past the end of the space.
fn odometer_at(base: usize, max_length: usize, index: u64) -> Option<Vec<usize>> {
    if base == 0 {
        return None;
    }
    let base_u64 = base as u64;
    let mut remaining = index;
    for length in 1..=max_length {
        let count = u32::try_from(length)
            .ok()
            .and_then(|exp| base_u64.checked_pow(exp));
        match count {
            Some(count) if remaining >= count => remaining -= count,
            // The index falls inside this length (an uncountable length
            // always contains any u64 index).
            _ => {
                let mut digits = vec![0usize; length];
                for digit in digits.iter_mut().rev() {
                    *digit = (remaining % base_u64) as usize;
                    remaining /= base_u64;
                }
                return Some(digits);
            }
        }
    }
    None
}
