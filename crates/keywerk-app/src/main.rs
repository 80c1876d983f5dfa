// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keywerk — PDF password recovery
//
// Entry point. Initialises logging, opens the target document, runs one
// recovery attempt with a live progress display, and reports the outcome.
// The `unlock` subcommand skips the search and decrypts with a known password.

mod cli;
mod progress;
mod unlock;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use keywerk_core::error::{KeywerkError, Result};
use keywerk_core::human_errors::{HumanError, humanize_error, humanize_result};
use keywerk_core::oracle::PasswordOracle;
use keywerk_core::types::RecoveryResult;
use keywerk_document::PdfPasswordOracle;
use keywerk_recovery::RecoveryController;
use tracing::{error, info, warn};

use cli::{Cli, Mode};
use progress::ProgressDisplay;
use unlock::{UnlockOutcome, unlock_file, write_unlocked};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    if let Mode::Unlock { password } = &args.mode {
        return unlock(&args, password);
    }

    match run(&args).await {
        Ok(result) => {
            print_outcome(&humanize_result(&result));
            println!(
                "  {} passwords tried in {:.2}s",
                result.attempts_tried(),
                result.elapsed().as_secs_f64()
            );
            match result {
                RecoveryResult::Found { .. } => ExitCode::SUCCESS,
                RecoveryResult::NotFound { .. } => ExitCode::from(1),
            }
        }
        Err(err) => fail(&err),
    }
}

/// `keywerk <file> unlock --password <pw>`: write a decrypted copy with a
/// password the user already knows.
fn unlock(args: &Cli, password: &str) -> ExitCode {
    match unlock_file(&args.file, password, &args.unlock_output()) {
        Ok(UnlockOutcome::Written(path)) => {
            println!("Unlocked copy written to {}", path.display());
            ExitCode::SUCCESS
        }
        Ok(UnlockOutcome::IncorrectPassword) => {
            println!("Incorrect password.");
            ExitCode::from(1)
        }
        Err(err) => fail(&err),
    }
}

fn fail(err: &KeywerkError) -> ExitCode {
    error!(error = %err, "keywerk failed");
    print_outcome(&humanize_error(err));
    ExitCode::from(2)
}

async fn run(args: &Cli) -> Result<RecoveryResult> {
    let config = args.recovery_config()?;
    let strategy = args.strategy()?;
    let oracle = Arc::new(PdfPasswordOracle::open(&args.file)?);

    info!(
        file = %args.file.display(),
        fingerprint = oracle.fingerprint(),
        encrypted = oracle.is_encrypted(),
        "Keywerk starting"
    );

    let controller = RecoveryController::new(config.clone())?;
    let handle = controller.start(strategy, Arc::clone(&oracle) as Arc<dyn PasswordOracle>)?;

    if let Some(timeout) = args.timeout() {
        let _deadline = handle.cancel_token().cancel_after(timeout);
    }
    {
        let token = handle.cancel_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, stopping recovery");
                token.cancel();
            }
        });
    }

    let display = ProgressDisplay::new(handle.progress().total_candidates);
    let mut ticker =
        tokio::time::interval(Duration::from_millis(config.progress_interval_ms.max(1)));
    while !handle.is_finished() {
        ticker.tick().await;
        display.update(&handle.progress());
    }
    display.update(&handle.progress());
    display.finish();

    let result = handle.await_result().await?;

    if let (Some(output), Some(password)) = (&args.output, result.password()) {
        write_unlocked(&oracle, password, output)?;
    }

    Ok(result)
}

fn print_outcome(outcome: &HumanError) {
    println!("{}", outcome.message);
    println!("  {}", outcome.suggestion);
}
