//! Admissibility comparison of two serialized forensic records.
//!
//! The comparator operates on serialized bytes, not on typed records: both
//! inputs are decoded into generic JSON trees and compared for deep
//! structural equality. Any well-formed JSON document is accepted, so a
//! record of one kind compared against a record of the other kind yields a
//! negative verdict rather than an error.

use serde_json::Value;

use crate::error::Result;

/// Verdict printed when both records are structurally identical.
pub const ADMISSIBLE: &str = "The files are admissible.";

/// Verdict printed when the records differ in any recorded attribute.
pub const NOT_ADMISSIBLE: &str = "The files are NOT admissible.";

/// Compare two serialized forensic records for deep structural equality.
///
/// Returns `Ok(true)` only when every recorded attribute matches, the
/// content hashes included. Object key order is irrelevant; sequence order
/// (worksheet names) is significant. Either input failing to decode is a
/// decoding error, never a `false` verdict.
pub fn compare(first: &[u8], second: &[u8]) -> Result<bool> {
    let first: Value = serde_json::from_slice(first)?;
    let second: Value = serde_json::from_slice(second)?;

    let admissible = first == second;
    tracing::info!("Compared forensic records: admissible = {}", admissible);

    Ok(admissible)
}

/// Map a comparison outcome to its fixed verdict line.
pub fn verdict(admissible: bool) -> &'static str {
    if admissible {
        ADMISSIBLE
    } else {
        NOT_ADMISSIBLE
    }
}
