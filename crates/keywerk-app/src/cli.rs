// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use keywerk_core::config::RecoveryConfig;
use keywerk_core::error::{KeywerkError, Result};
use keywerk_core::types::{Charset, Strategy};
use keywerk_document::load_wordlist;

#[derive(Debug, Parser)]
#[command(name = "keywerk", version)]
#[command(about = "Recover the password of an encrypted PDF", long_about = None)]
pub struct Cli {
    /// Encrypted PDF to recover
    pub file: PathBuf,

    #[command(subcommand)]
    pub mode: Mode,

    #[command(flatten)]
    pub tuning: Tuning,

    /// Write a copy of the document without a password here once recovered
    /// (for `unlock`, defaults to `<file>-unlocked.pdf`)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Mode {
    /// Try wordlists and the built-in list of common passwords
    Dictionary {
        /// Wordlist file (.txt or .csv); may be given more than once
        #[arg(short, long, value_name = "FILE")]
        wordlist: Vec<PathBuf>,
        /// Skip the built-in list of common passwords
        #[arg(long)]
        no_common: bool,
    },
    /// Try every combination of the chosen characters
    BruteForce {
        #[arg(long)]
        digits: bool,
        #[arg(long)]
        lowercase: bool,
        #[arg(long)]
        uppercase: bool,
        #[arg(long)]
        symbols: bool,
        /// Explicit character set; overrides the class flags
        #[arg(long, value_name = "CHARS")]
        charset: Option<String>,
        /// Longest password to try
        #[arg(long, default_value_t = 4)]
        max_length: usize,
    },
    /// Write a decrypted copy using a password you already know
    Unlock {
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Debug, Args)]
pub struct Tuning {
    /// JSON file with recovery settings
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Batches checked at the same time
    #[arg(long, global = true)]
    pub pool_size: Option<usize>,
    /// Candidates per batch
    #[arg(long, global = true)]
    pub batch_size: Option<usize>,
}

impl Cli {
    /// Settings from `--config` (or defaults) with flag overrides applied.
    pub fn recovery_config(&self) -> Result<RecoveryConfig> {
        let mut config = match &self.tuning.config {
            Some(path) => RecoveryConfig::load(path)?,
            None => RecoveryConfig::default(),
        };
        if let Some(pool_size) = self.tuning.pool_size {
            config.pool_size = pool_size;
        }
        if let Some(batch_size) = self.tuning.batch_size {
            config.batch_size = batch_size;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Where `unlock` writes: `--output`, or `<stem>-unlocked.pdf` next to
    /// the input.
    pub fn unlock_output(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        let stem = self
            .file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".into());
        self.file.with_file_name(format!("{stem}-unlocked.pdf"))
    }

    /// Build the search strategy, reading any wordlists.
    pub fn strategy(&self) -> Result<Strategy> {
        match &self.mode {
            Mode::Dictionary {
                wordlist,
                no_common,
            } => {
                // Each file is deduplicated on load; repeats across files
                // are dropped here, keeping the first occurrence.
                let mut seen = HashSet::new();
                let mut words = Vec::new();
                for path in wordlist {
                    for word in load_wordlist(path)? {
                        if seen.insert(word.clone()) {
                            words.push(word);
                        }
                    }
                }
                Ok(Strategy::Dictionary {
                    words,
                    include_common_defaults: !no_common,
                })
            }
            Mode::BruteForce {
                digits,
                lowercase,
                uppercase,
                symbols,
                charset,
                max_length,
            } => {
                let charset = match charset {
                    Some(chars) => Charset::new(chars),
                    // Digits only unless a class is chosen.
                    None if !(*digits || *lowercase || *uppercase || *symbols) => {
                        Charset::from_classes(true, false, false, false)
                    }
                    None => Charset::from_classes(*digits, *lowercase, *uppercase, *symbols),
                };
                Ok(Strategy::BruteForce {
                    charset,
                    max_length: *max_length,
                })
            }
            Mode::Unlock { .. } => Err(KeywerkError::InvalidStrategy(
                "unlock does not search for a password".into(),
            )),
        }
    }
}
