// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF password oracle — answers "does this password open the document?"
// using the `lopdf` crate.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use keywerk_core::error::{KeywerkError, Result};
use keywerk_core::oracle::PasswordOracle;
use lopdf::encryption::DecryptionError;
use lopdf::xref::XrefEntry;
use lopdf::{Document, Object, ObjectId, Reader};
use tracing::{debug, info, instrument};

use crate::fingerprint::{document_fingerprint, short_fingerprint};

/// Tests candidate passwords against one encrypted PDF.
///
/// The document is parsed once. Each check only runs the security handler's
/// key derivation against the shared, read-only `Document`, so any number of
/// workers can call [`PasswordOracle::try_open`] at once.
#[derive(Debug, Clone)]
pub struct PdfPasswordOracle {
    /// The target document as loaded from disk or memory.
    bytes: Arc<[u8]>,
    /// Parsed form of `bytes`. For an encrypted target only the `/Encrypt`
    /// dictionary and the trailer are guaranteed to be present.
    document: Arc<Document>,
    /// SHA-256 of `bytes`, for logs and reports.
    fingerprint: String,
    encrypted: bool,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfPasswordOracle {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let data = std::fs::read(path_ref)?;
        let mut oracle = Self::from_bytes(&data)?;
        oracle.source_path = Some(path_ref.display().to_string());
        Ok(oracle)
    }

    /// Create an oracle from raw PDF bytes already in memory.
    ///
    /// Fails with `OracleFault` if the bytes are not a PDF `lopdf` can parse:
    /// no password can open a document that cannot be read.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|err| KeywerkError::OracleFault(format!("failed to load PDF: {}", err)))?;
        let encrypted = document.is_encrypted();
        let fingerprint = document_fingerprint(data);

        debug!(fingerprint = short_fingerprint(&fingerprint), encrypted, "PDF loaded from bytes");

        Ok(Self {
            bytes: Arc::from(data),
            document: Arc::new(document),
            fingerprint,
            encrypted,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Whether the document needs a password at all.
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// SHA-256 hex digest of the target document.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Return the source path if the oracle was created via [`PdfPasswordOracle::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    // -- Unlocking ------------------------------------------------------------

    /// Decrypt the document with `password` and serialise it without
    /// encryption.
    ///
    /// The output is reloaded before it is returned; it must parse without a
    /// password and have the same, non-zero number of pages as the decrypted
    /// document. Anything else is a `PdfError`.
    #[instrument(skip_all, fields(fingerprint = short_fingerprint(&self.fingerprint)))]
    pub fn unlock(&self, password: &str) -> Result<Vec<u8>> {
        if !self.try_open(password)? {
            return Err(KeywerkError::PdfError(
                "password does not open this document".into(),
            ));
        }

        let mut document = if self.encrypted {
            self.decrypted(password)?
        } else {
            (*self.document).clone()
        };

        let pages = document.get_pages().len();
        if pages == 0 {
            return Err(KeywerkError::PdfError(
                "decrypted document has no pages".into(),
            ));
        }

        let mut output = Vec::new();
        document.save_to(&mut output).map_err(|err| {
            KeywerkError::PdfError(format!("failed to serialise unlocked PDF: {}", err))
        })?;

        let reloaded = Document::load_mem(&output).map_err(|err| {
            KeywerkError::PdfError(format!("unlocked PDF does not reload: {}", err))
        })?;
        if reloaded.is_encrypted() || reloaded.get_pages().len() != pages {
            return Err(KeywerkError::PdfError(format!(
                "unlocked PDF is incomplete: expected {} pages, found {}",
                pages,
                reloaded.get_pages().len()
            )));
        }

        info!(output_bytes = output.len(), pages, "PDF unlocked");
        Ok(output)
    }

    // -- Helpers --------------------------------------------------------------

    /// Re-read every object from the raw bytes and decrypt the lot.
    ///
    /// `load_mem` only keeps the `/Encrypt` dictionary of a document it could
    /// not open with the empty password, so the body has to be read again.
    fn decrypted(&self, password: &str) -> Result<Document> {
        let start = self
            .bytes
            .windows(5)
            .position(|window| window == b"%PDF-")
            .unwrap_or(0);

        let mut skeleton = (*self.document).clone();
        skeleton.objects.clear();
        skeleton.encryption_state = None;

        let reader = Reader {
            buffer: &self.bytes[start..],
            document: skeleton,
            encryption_state: None,
            raw_objects: BTreeMap::new(),
        };

        let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
        for (&number, entry) in &reader.document.reference_table.entries {
            let XrefEntry::Normal { generation, .. } = *entry else {
                continue;
            };
            let id = (number, generation);
            match reader.get_object(id, &mut HashSet::new()) {
                Ok(object) if is_xref_stream(&object) => {}
                Ok(object) => {
                    objects.insert(id, object);
                }
                Err(err) => debug!(object = ?id, error = %err, "skipping unreadable object"),
            }
        }

        let mut document = reader.document;
        document.objects = objects;
        document
            .decrypt(password)
            .map_err(|err| KeywerkError::PdfError(format!("decryption failed: {}", err)))?;
        document.encryption_state = None;
        Ok(document)
    }
}

impl PasswordOracle for PdfPasswordOracle {
    fn try_open(&self, candidate: &str) -> Result<bool> {
        if !self.encrypted {
            return Ok(true);
        }
        match self.document.authenticate_password(candidate) {
            Ok(()) => Ok(true),
            Err(lopdf::Error::Decryption(DecryptionError::IncorrectPassword)) => Ok(false),
            // A candidate the security handler cannot normalise (SASLprep,
            // revision 5 and up) can never be the password.
            Err(lopdf::Error::Decryption(DecryptionError::StringPrep(_))) => Ok(false),
            Err(err) => Err(KeywerkError::OracleFault(format!(
                "cannot check password: {}",
                err
            ))),
        }
    }
}

fn is_xref_stream(object: &Object) -> bool {
    object
        .as_stream()
        .map(|stream| stream.dict.has_type(b"XRef"))
        .unwrap_or(false)
}
