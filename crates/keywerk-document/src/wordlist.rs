// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Custom wordlists for dictionary recovery.
//
// Plain text files hold one password per line; CSV files contribute every
// cell below the header row, column by column. Entries are trimmed, blanks
// are dropped, and repeats are removed keeping the first occurrence, so the
// dictionary never tries the same word twice.

use std::collections::HashSet;
use std::path::Path;

use keywerk_core::error::{KeywerkError, Result};
use keywerk_core::types::Candidate;
use tracing::{debug, info, instrument};

/// Supported wordlist file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordlistFormat {
    Text,
    Csv,
}

impl WordlistFormat {
    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "lst" | "dic" => Some(Self::Text),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                KeywerkError::Wordlist(format!(
                    "unsupported wordlist type: {}",
                    path.display()
                ))
            })
    }
}

/// Read a wordlist file, picking the format from its extension.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_wordlist(path: impl AsRef<Path>) -> Result<Vec<Candidate>> {
    let path_ref = path.as_ref();
    let format = WordlistFormat::from_path(path_ref)?;
    let data = std::fs::read(path_ref)?;
    let words = parse_wordlist(&data, format)?;
    info!(words = words.len(), ?format, "wordlist loaded");
    Ok(words)
}

/// Parse wordlist bytes in the given format.
pub fn parse_wordlist(data: &[u8], format: WordlistFormat) -> Result<Vec<Candidate>> {
    let text = decode_text(data);
    let raw = match format {
        WordlistFormat::Text => text.lines().map(str::to_owned).collect(),
        WordlistFormat::Csv => csv_cells(&text)?,
    };
    Ok(clean(raw))
}

/// UTF-8 when valid, otherwise Latin-1 (every byte maps to one char).
fn decode_text(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.strip_prefix('\u{feff}').unwrap_or(text).to_owned(),
        Err(_) => {
            debug!("wordlist is not UTF-8, decoding as Latin-1");
            data.iter().map(|&byte| byte as char).collect()
        }
    }
}

/// Every cell below the header, column-major.
fn csv_cells(text: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(|err| KeywerkError::Wordlist(format!("CSV: {err}")))?);
    }

    let columns = rows.iter().map(csv::StringRecord::len).max().unwrap_or(0);
    let mut cells = Vec::with_capacity(rows.len() * columns);
    for column in 0..columns {
        for row in &rows {
            if let Some(cell) = row.get(column) {
                cells.push(cell.to_owned());
            }
        }
    }
    Ok(cells)
}

fn clean(raw: Vec<String>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|word| word.trim().to_owned())
        .filter(|word| !word.is_empty())
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_lines_are_trimmed_and_deduplicated() {
        let words = parse_wordlist(b"  hunter2 \n\nletmein\r\nhunter2\n", WordlistFormat::Text).unwrap();
        assert_eq!(words, vec!["hunter2", "letmein"]);
    }

    #[test]
    fn latin1_fallback() {
        // "pässwort" in Latin-1: 0xE4 is not valid UTF-8 on its own.
        let words = parse_wordlist(b"p\xe4sswort\n", WordlistFormat::Text).unwrap();
        assert_eq!(words, vec!["pässwort"]);
    }

    #[test]
    fn utf8_bom_is_ignored() {
        let words = parse_wordlist("\u{feff}geheim\n".as_bytes(), WordlistFormat::Text).unwrap();
        assert_eq!(words, vec!["geheim"]);
    }

    #[test]
    fn csv_cells_are_read_column_by_column() {
        let data = b"first,second\nalpha,beta\ngamma,delta\n";
        let words = parse_wordlist(data, WordlistFormat::Csv).unwrap();
        assert_eq!(words, vec!["alpha", "gamma", "beta", "delta"]);
    }

    #[test]
    fn csv_ragged_rows_are_accepted() {
        let data = b"passwords\nalpha\nbeta,extra\n";
        let words = parse_wordlist(data, WordlistFormat::Csv).unwrap();
        assert_eq!(words, vec!["alpha", "beta", "extra"]);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(WordlistFormat::from_extension("TXT"), Some(WordlistFormat::Text));
        assert_eq!(WordlistFormat::from_extension("csv"), Some(WordlistFormat::Csv));
        assert_eq!(WordlistFormat::from_extension("docx"), None);
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let err = load_wordlist("words.xlsx").unwrap_err();
        assert!(matches!(err, KeywerkError::Wordlist(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "one\ntwo\n").unwrap();

        assert_eq!(load_wordlist(&path).unwrap(), vec!["one", "two"]);
    }
}
