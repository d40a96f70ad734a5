//! Shared access to the OOXML container and its core-properties part.
//!
//! Both supported formats are ZIP containers following the Open Packaging
//! Conventions, and both store descriptive properties in the same
//! `docProps/core.xml` part. The format-specific extractors build on the
//! helpers here for everything container-shaped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{ForensicError, Result};

/// Part holding the document's descriptive properties.
pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// Open the document at `path` as an OOXML container.
pub fn open_container(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path)?;
    ZipArchive::new(file).map_err(|e| {
        ForensicError::Extraction(format!(
            "{} is not a valid document container: {e}",
            path.display()
        ))
    })
}

/// Read a part that must exist; its absence is an extraction error.
pub fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Result<String> {
    read_optional_part(archive, name)?
        .ok_or_else(|| ForensicError::Extraction(format!("missing required part {name:?}")))
}

/// Read a part that may legitimately be absent, as UTF-8 text.
pub fn read_optional_part(archive: &mut ZipArchive<File>, name: &str) -> Result<Option<String>> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(ForensicError::Extraction(format!(
                "cannot open part {name:?}: {e}"
            )))
        }
    };

    let mut raw = Vec::new();
    part.read_to_end(&mut raw)?;

    let text = String::from_utf8(raw)
        .map_err(|_| ForensicError::Extraction(format!("part {name:?} is not valid UTF-8")))?;
    Ok(Some(text))
}

/// Descriptive properties shared by both document kinds.
///
/// Absent elements stay as empty strings; a document with no
/// core-properties part at all decodes to the all-empty default.
#[derive(Debug, Clone, Default)]
pub struct CoreProperties {
    pub creator: String,
    pub title: String,
    pub created: String,
    pub modified: String,
}

enum CoreField {
    Creator,
    Title,
    Created,
    Modified,
}

impl CoreField {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"creator" => Some(Self::Creator),
            b"title" => Some(Self::Title),
            b"created" => Some(Self::Created),
            b"modified" => Some(Self::Modified),
            _ => None,
        }
    }
}

/// Parse the core-properties XML into its four fields of interest.
///
/// Matching is on local names, so the `dc:`/`dcterms:` prefixes can be
/// bound to any alias. Unrecognized elements are skipped.
pub fn parse_core_properties(xml: &str) -> Result<CoreProperties> {
    let mut reader = Reader::from_str(xml);
    let mut props = CoreProperties::default();
    let mut current: Option<CoreField> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                current = CoreField::from_local_name(e.local_name().as_ref());
            }
            Ok(Event::Text(ref t)) => {
                if let Some(ref field) = current {
                    let text = t
                        .unescape()
                        .map_err(|e| malformed(CORE_PROPERTIES_PART, e))?;
                    let target = match field {
                        CoreField::Creator => &mut props.creator,
                        CoreField::Title => &mut props.title,
                        CoreField::Created => &mut props.created,
                        CoreField::Modified => &mut props.modified,
                    };
                    target.push_str(&text);
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(CORE_PROPERTIES_PART, e)),
        }
    }

    Ok(props)
}

/// Uniform extraction error for a part that fails to parse.
pub(crate) fn malformed(part: &str, e: impl std::fmt::Display) -> ForensicError {
    ForensicError::Extraction(format!("malformed part {part:?}: {e}"))
}
