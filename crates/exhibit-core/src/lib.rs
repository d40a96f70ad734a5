//! Core library for forensic admissibility records over office documents.
//!
//! A record couples a SHA-256 content hash with structural metadata
//! extracted from the document container. Two documents are admissible as
//! copies of one another only when their records match exactly.
//!
//! ```no_run
//! use exhibit_core::{compare, generate, verdict};
//!
//! # fn main() -> exhibit_core::Result<()> {
//! let bytes = std::fs::read("contract.docx")?;
//! let record = generate("contract.docx", &bytes)?;
//! std::fs::write("forensic_data.json", record.to_json_bytes()?)?;
//!
//! let first = std::fs::read("forensic_data.json")?;
//! let second = std::fs::read("reference_record.json")?;
//! println!("{}", verdict(compare(&first, &second)?));
//! # Ok(())
//! # }
//! ```

use std::io::Write;

use tempfile::NamedTempFile;

pub mod compare;
pub mod error;
pub mod extract;
pub mod hash;
pub mod record;

// Re-export the record model and both entry points
pub use compare::{compare, verdict, ADMISSIBLE, NOT_ADMISSIBLE};
pub use error::{ForensicError, Result};
pub use extract::{extract_metadata, FileFacts};
pub use hash::sha256_hex;
pub use record::{ForensicRecord, Metadata, SpreadsheetMetadata, WordMetadata};

/// The two supported document kinds, decided by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Word,
    Spreadsheet,
}

impl FileKind {
    /// Classify a file by the extension of its name, case-insensitively.
    ///
    /// Anything other than `.docx` or `.xlsx` is rejected up front so no
    /// parsing is ever attempted on an unsupported format.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "docx" => Ok(FileKind::Word),
            "xlsx" => Ok(FileKind::Spreadsheet),
            _ => Err(ForensicError::UnsupportedExtension(extension)),
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Word => write!(f, "word document"),
            FileKind::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

/// Generate the forensic record for a document given as raw bytes.
///
/// The hash covers the bytes exactly as received. For metadata extraction
/// the bytes are written to a scoped temporary copy, so the filesystem
/// facts in the record describe that stored snapshot.
pub fn generate(file_name: &str, bytes: &[u8]) -> Result<ForensicRecord> {
    let kind = FileKind::from_file_name(file_name)?;
    tracing::info!(
        "Generating forensic record for {} ({} bytes, {})",
        file_name,
        bytes.len(),
        kind
    );

    let hash = hash::sha256_hex(bytes);

    // The temp copy lives exactly as long as extraction needs it
    let mut temp = NamedTempFile::new()?;
    temp.write_all(bytes)?;
    temp.flush()?;

    let metadata = extract::extract_metadata(temp.path(), kind)?;

    tracing::info!("Record complete for {} (hash {})", file_name, hash);

    Ok(ForensicRecord { hash, metadata })
}
