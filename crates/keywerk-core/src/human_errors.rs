// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language messages for recovery outcomes and errors.
//
// Front ends show `message` as a heading and `suggestion` as body text. The
// severity drives icon/colour.

use crate::error::KeywerkError;
use crate::types::RecoveryResult;

/// Severity of an outcome from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The attempt succeeded.
    Success,
    /// The user can change settings and try again.
    ActionRequired,
    /// Retrying will not help: the document itself is the problem.
    Permanent,
}

/// A human-readable outcome with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `KeywerkError` into a message a non-technical user can act on.
pub fn humanize_error(err: &KeywerkError) -> HumanError {
    match err {
        KeywerkError::InvalidStrategy(detail) => HumanError {
            message: "There is nothing to try with these settings.".into(),
            suggestion: format!(
                "Pick at least one character group for brute force, or load a wordlist. ({detail})"
            ),
            severity: Severity::ActionRequired,
        },

        KeywerkError::InvalidConfig(detail) => HumanError {
            message: "The recovery settings are not valid.".into(),
            suggestion: format!("Check the worker and batch sizes. ({detail})"),
            severity: Severity::ActionRequired,
        },

        KeywerkError::OracleFault(detail) | KeywerkError::PdfError(detail) => HumanError {
            message: "This document can't be read.".into(),
            suggestion: format!(
                "The file may be damaged or not a PDF. Try getting a fresh copy. ({detail})"
            ),
            severity: Severity::Permanent,
        },

        KeywerkError::Cancelled { attempts_tried, .. } => HumanError {
            message: "Recovery was stopped.".into(),
            suggestion: format!(
                "{attempts_tried} passwords were tried before stopping. Start again to continue searching."
            ),
            severity: Severity::ActionRequired,
        },

        KeywerkError::RecoveryTask(detail) => HumanError {
            message: "The recovery stopped unexpectedly.".into(),
            suggestion: format!("Please try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        KeywerkError::Wordlist(detail) => HumanError {
            message: "The wordlist couldn't be loaded.".into(),
            suggestion: format!("Use a plain text (.txt) or CSV (.csv) file. ({detail})"),
            severity: Severity::ActionRequired,
        },

        KeywerkError::Io(io_err) => HumanError {
            message: "A file couldn't be opened.".into(),
            suggestion: format!("Check the file exists and you can read it. ({io_err})"),
            severity: Severity::ActionRequired,
        },

        KeywerkError::Serialization(detail) => HumanError {
            message: "The settings file is not valid.".into(),
            suggestion: format!("Fix or delete the settings file. ({detail})"),
            severity: Severity::ActionRequired,
        },
    }
}

/// Describe a finished attempt.
pub fn humanize_result(result: &RecoveryResult) -> HumanError {
    match result {
        RecoveryResult::Found { password, .. } if password.is_empty() => HumanError {
            message: "Unlocked: this document has no open password.".into(),
            suggestion: "It only carries owner restrictions (printing, copying). No password is needed to open it.".into(),
            severity: Severity::Success,
        },
        RecoveryResult::Found { password, .. } => HumanError {
            message: "Password found.".into(),
            suggestion: format!("The password is: {password}"),
            severity: Severity::Success,
        },
        RecoveryResult::NotFound { attempts_tried, .. } => HumanError {
            message: "The password wasn't found.".into(),
            suggestion: format!(
                "{attempts_tried} passwords were tried. Try a bigger wordlist, more character groups, or a longer maximum length."
            ),
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fault_is_permanent() {
        let human = humanize_error(&KeywerkError::OracleFault("xref table missing".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("xref table missing"));
    }

    #[test]
    fn cancellation_reports_attempts() {
        let human = humanize_error(&KeywerkError::Cancelled {
            attempts_tried: 42,
            elapsed: Duration::from_secs(1),
        });
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.starts_with("42 "));
    }

    #[test]
    fn empty_password_reads_as_owner_restriction() {
        let human = humanize_result(&RecoveryResult::Found {
            password: String::new(),
            elapsed: Duration::ZERO,
            attempts_tried: 1,
        });
        assert_eq!(human.severity, Severity::Success);
        assert!(human.suggestion.contains("owner restrictions"));
    }

    #[test]
    fn not_found_suggests_wider_search() {
        let human = humanize_result(&RecoveryResult::NotFound {
            attempts_tried: 7,
            elapsed: Duration::ZERO,
        });
        assert_eq!(human.severity, Severity::ActionRequired);
    }
}
