//! Metadata extraction from office documents.
//!
//! The extractors are read-only: they open the stored file, pull apart its
//! container, and never write back. Filesystem facts (size, access time)
//! are captured in a single stat call before any parsing so that every
//! field of one record describes the same observation of the file.

pub mod docx;
pub mod opc;
pub mod xlsx;

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

use crate::error::Result;
use crate::record::Metadata;
use crate::FileKind;

/// Hour-precision timestamp layout shared by every timestamp field.
const HOUR_FORMAT: &str = "%Y-%m-%d %H";

/// Filesystem facts about the stored file, captured once up front.
#[derive(Debug, Clone)]
pub struct FileFacts {
    pub size_bytes: u64,
    pub last_access: String,
}

impl FileFacts {
    /// Stat the file once and derive both fields from that single call.
    ///
    /// The access time is rendered in local time, truncated to the hour.
    pub fn capture(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path)?;
        let accessed: DateTime<Local> = meta.accessed()?.into();

        Ok(Self {
            size_bytes: meta.len(),
            last_access: accessed.format(HOUR_FORMAT).to_string(),
        })
    }
}

/// Extract kind-shaped metadata from the document at `path`.
pub fn extract_metadata(path: &Path, kind: FileKind) -> Result<Metadata> {
    // Stat before parsing: all fields describe one observation.
    let facts = FileFacts::capture(path)?;

    match kind {
        FileKind::Word => docx::extract(path, facts),
        FileKind::Spreadsheet => xlsx::extract(path, facts),
    }
}

/// Truncate a document-property timestamp to hour precision in UTC.
///
/// Core-properties dates arrive as W3CDTF strings, usually
/// `2024-01-15T10:30:00Z`. Offset forms are normalized to UTC before
/// truncation so the same instant always yields the same field value.
/// W3CDTF also allows reduced precision: date-only values gain an hour of
/// `00`, and year-month or bare-year values complete to the first day of
/// the period. Empty or unparseable input yields the empty string.
pub fn truncate_to_hour(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return instant.with_timezone(&Utc).format(HOUR_FORMAT).to_string();
    }

    // Zone-less variant some producers emit
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return naive.format(HOUR_FORMAT).to_string();
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return format!("{} 00", date.format("%Y-%m-%d"));
    }

    // Reduced-precision forms, completed to the first day they cover
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return format!("{} 00", date.format("%Y-%m-%d"));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01-01"), "%Y-%m-%d") {
        return format!("{} 00", date.format("%Y-%m-%d"));
    }

    String::new()
}
