// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal progress display.
//
// - Countable search space: a bar with percentage
// - Space too large to count: a spinner

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use keywerk_core::types::ProgressSnapshot;

pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    pub fn new(total_candidates: Option<u64>) -> Self {
        let bar = match total_candidates {
            Some(total) => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.cyan} [{bar:40.cyan/blue}] {percent:>3}% {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{spinner:.cyan} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner())
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
                );
                bar
            }
        };
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn update(&self, snapshot: &ProgressSnapshot) {
        self.bar.set_position(snapshot.candidates_tried);
        self.bar.set_message(status_line(snapshot));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// "1200 tried, 350/s" with the percentage in front when the total is known.
pub fn status_line(snapshot: &ProgressSnapshot) -> String {
    let counts = format!(
        "{} tried, {:.0}/s",
        snapshot.candidates_tried, snapshot.rate_per_second
    );
    match snapshot.fraction() {
        Some(fraction) => format!("{:.1}% · {counts}", fraction * 100.0),
        None => counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_with_known_total() {
        let snapshot = ProgressSnapshot {
            completed_batches: 3,
            total_batches: Some(10),
            candidates_tried: 250,
            total_candidates: Some(1000),
            rate_per_second: 125.4,
        };
        assert_eq!(status_line(&snapshot), "25.0% · 250 tried, 125/s");
    }

    #[test]
    fn status_line_without_total() {
        let snapshot = ProgressSnapshot {
            candidates_tried: 7,
            ..Default::default()
        };
        assert_eq!(status_line(&snapshot), "7 tried, 0/s");
    }
}
