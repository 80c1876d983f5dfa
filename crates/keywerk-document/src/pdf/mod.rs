// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — password checks and unlocking.

pub mod oracle;

pub use oracle::PdfPasswordOracle;
