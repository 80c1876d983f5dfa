// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// keywerk-document — The document side of password recovery.
//
// Provides the PDF password oracle the recovery engine tests candidates
// against, SHA-256 fingerprinting of target documents, and loading of custom
// wordlists from text and CSV files.

pub mod fingerprint;
pub mod pdf;
pub mod wordlist;

pub use pdf::oracle::PdfPasswordOracle;
pub use wordlist::{load_wordlist, parse_wordlist};
