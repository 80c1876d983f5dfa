// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keywerk — Core types, errors, and the password oracle contract shared across
// all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod oracle;
pub mod types;

pub use config::RecoveryConfig;
pub use error::KeywerkError;
pub use oracle::PasswordOracle;
pub use types::*;
