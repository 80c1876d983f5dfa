// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recovery configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KeywerkError, Result};

/// Tunables for a recovery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Number of batches checked concurrently (default 4).
    pub pool_size: usize,
    /// Maximum number of candidates per batch (default 50).
    pub batch_size: usize,
    /// How often front ends should sample progress, in milliseconds.
    pub progress_interval_ms: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            batch_size: 50,
            progress_interval_ms: 250,
        }
    }
}

impl RecoveryConfig {
    /// Load settings from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(KeywerkError::InvalidConfig(
                "pool_size must be at least 1".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(KeywerkError::InvalidConfig(
                "batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = RecoveryConfig::default();
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.batch_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let config = RecoveryConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(KeywerkError::InvalidConfig(_))));
    }

    #[test]
    fn load_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "pool_size": 8 }}"#).unwrap();

        let config = RecoveryConfig::load(file.path()).unwrap();
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.batch_size, 50);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "pool_size = 8").unwrap();

        assert!(matches!(
            RecoveryConfig::load(file.path()),
            Err(KeywerkError::Serialization(_))
        ));
    }
}
