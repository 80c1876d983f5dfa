// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The single capability the recovery engine consumes from the outside world:
// "does this password open the target document?"

use crate::error::Result;

/// Tests one candidate password against the target document.
///
/// Implementations must be safe to call concurrently from several workers
/// against the same document. An ordinary wrong password is `Ok(false)`;
/// only a genuine inability to evaluate the document (corrupt file, I/O
/// failure) is reported as `Err(KeywerkError::OracleFault)`.
pub trait PasswordOracle: Send + Sync {
    fn try_open(&self, candidate: &str) -> Result<bool>;
}

impl<F> PasswordOracle for F
where
    F: Fn(&str) -> Result<bool> + Send + Sync,
{
    fn try_open(&self, candidate: &str) -> Result<bool> {
        self(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeywerkError;

    #[test]
    fn closures_are_oracles() {
        let oracle = |candidate: &str| -> Result<bool> { Ok(candidate == "open sesame") };
        assert!(!oracle.try_open("").unwrap());
        assert!(oracle.try_open("open sesame").unwrap());
    }

    #[test]
    fn faults_pass_through() {
        let oracle = |_: &str| -> Result<bool> { Err(KeywerkError::OracleFault("truncated".into())) };
        assert!(matches!(
            oracle.try_open("x"),
            Err(KeywerkError::OracleFault(reason)) if reason == "truncated"
        ));
    }
}
