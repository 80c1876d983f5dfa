// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decrypting with a known password.

use std::path::{Path, PathBuf};

use keywerk_core::error::Result;
use keywerk_core::oracle::PasswordOracle;
use keywerk_document::PdfPasswordOracle;
use tracing::info;

#[derive(Debug, PartialEq, Eq)]
pub enum UnlockOutcome {
    Written(PathBuf),
    IncorrectPassword,
}

/// Check `password` against `file` and, if it opens, write a decrypted copy
/// to `output`.
pub fn unlock_file(file: &Path, password: &str, output: &Path) -> Result<UnlockOutcome> {
    let oracle = PdfPasswordOracle::open(file)?;
    if !oracle.try_open(password)? {
        return Ok(UnlockOutcome::IncorrectPassword);
    }
    write_unlocked(&oracle, password, output)?;
    Ok(UnlockOutcome::Written(output.to_path_buf()))
}

pub fn write_unlocked(oracle: &PdfPasswordOracle, password: &str, output: &Path) -> Result<()> {
    let unlocked = oracle.unlock(password)?;
    std::fs::write(output, unlocked)?;
    info!(path = %output.display(), "unlocked copy written");
    Ok(())
}
