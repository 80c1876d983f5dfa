// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document fingerprints: identify a target in logs and reports by digest,
// never by content.

use sha2::{Digest, Sha256};

/// Hex digits kept by [`short_fingerprint`].
const SHORT_LEN: usize = 12;

/// Lowercase hex SHA-256 of the document bytes.
pub fn document_fingerprint(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Leading digits of a fingerprint, for log lines.
pub fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..SHORT_LEN).unwrap_or(fingerprint)
}
