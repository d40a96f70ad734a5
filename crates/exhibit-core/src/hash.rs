//! Content hashing for forensic records.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of a byte sequence as lowercase hex.
///
/// A deterministic pure function of the input bytes: file name, timestamps,
/// and surrounding metadata never influence the digest. Any byte sequence,
/// including the empty one, is valid input.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
