//! Error taxonomy for record generation and comparison.

use thiserror::Error;

/// Errors surfaced by record generation and comparison.
///
/// Every failure is local to a single generate-or-compare call: nothing is
/// retried, nothing is persisted, and no failure corrupts any other call.
#[derive(Debug, Error)]
pub enum ForensicError {
    /// The file-name extension maps to no supported kind.
    #[error("unsupported file extension {0:?} (expected .docx or .xlsx)")]
    UnsupportedExtension(String),

    /// Content hashing failed.
    ///
    /// The SHA-256 path accepts any byte sequence, including the empty one,
    /// so this variant is never produced today; it is part of the public
    /// contract for completeness.
    #[error("content hashing failed: {0}")]
    Hashing(String),

    /// The file could not be parsed as the declared kind: not a ZIP
    /// container, a required part is missing, or a part is malformed.
    #[error("metadata extraction failed: {0}")]
    Extraction(String),

    /// Serialized record bytes are not valid UTF-8 JSON. Distinct from a
    /// negative verdict: a record that cannot be decoded is an error, never
    /// "not admissible".
    #[error("forensic record decoding failed: {0}")]
    Decoding(#[from] serde_json::Error),

    /// Filesystem-level failure (temp copy creation, metadata stat).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ForensicError>;
