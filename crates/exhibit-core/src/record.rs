//! The forensic record model and its canonical JSON encoding.
//!
//! A record is the `{hash, metadata}` pair standing in as a
//! content-and-structure fingerprint of one document. Records are
//! write-once: once serialized, they are treated as immutable snapshots
//! and the comparator never mutates them.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The unit of forensic evidence: content hash plus structural metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForensicRecord {
    /// Lowercase hex SHA-256 of the exact input byte sequence.
    pub hash: String,

    /// Structural and descriptive attributes; shape depends on the file kind.
    pub metadata: Metadata,
}

/// Kind-shaped metadata.
///
/// The serialized form carries no kind discriminator; the field set itself
/// tells the two shapes apart (`word_count`/`num_images` vs
/// `num_sheets`/`sheet_names`/`num_cells`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metadata {
    Word(WordMetadata),
    Spreadsheet(SpreadsheetMetadata),
}

/// Metadata extracted from a word-processing document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordMetadata {
    /// Size of the stored file in bytes.
    pub size_bytes: u64,

    /// Hour-truncated last-access timestamp of the stored file.
    pub last_access: String,

    /// `dc:creator` from the core-properties part; empty when absent.
    pub author: String,

    /// `dc:title` from the core-properties part; empty when absent.
    pub title: String,

    /// Hour-truncated `dcterms:created`; empty when absent or unparseable.
    pub created: String,

    /// Hour-truncated `dcterms:modified`; empty when absent or unparseable.
    pub modified: String,

    /// Whitespace-delimited tokens summed across all body paragraphs.
    pub word_count: u64,

    /// Inline embedded graphics anywhere in the document body.
    pub num_images: u64,
}

/// Metadata extracted from a spreadsheet workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetMetadata {
    pub size_bytes: u64,
    pub last_access: String,

    /// `dc:creator` from the core-properties part; empty when absent.
    pub creator: String,
    pub title: String,
    pub created: String,
    pub modified: String,

    /// Number of worksheets in the workbook.
    pub num_sheets: u64,

    /// Worksheet names in workbook file order. Order is significant for
    /// record equality.
    pub sheet_names: Vec<String>,

    /// Sum across all sheets of the rows a row-iterating reader yields:
    /// the declared dimension's end row when the sheet carries one,
    /// otherwise the highest row reference. A row-count proxy, not a true
    /// cell tally; both the computation and the field name are kept so all
    /// records stay comparable under one definition.
    pub num_cells: u64,
}

impl ForensicRecord {
    /// Encode the record as canonical compact JSON (UTF-8), exactly two
    /// top-level keys: `hash` and `metadata`.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a record from serialized bytes.
    ///
    /// Tolerant of arbitrary key ordering; fails with a decoding error on
    /// malformed input. Round-trip law:
    /// `from_json_bytes(to_json_bytes(r)) == r` for all valid records.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
