//! crates/adm_io/src/hasher.rs
//!
//! Deterministic hashing and ID builders for canonical artifacts.
//!
//! - Use `sha256_canonical(..)` for JSON values/structs (goes through canonical_json).
//! - Use `sha256_hex(..)` for raw bytes.
//! - Hex digests are lowercase.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::IoError;

/// Short digest length used in record IDs.
pub const SHORT_HEX_LEN: usize = 16;

#[inline]
pub fn is_lower_hex_64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    let bytes = to_canonical_bytes(value)?;
    Ok(sha256_hex(&bytes))
}

/// `RND:<round>-<16 hex>` built from the inventory digest after the round.
pub fn round_record_id(round: u32, inventory_after_hex: &str) -> Result<String, IoError> {
    if !is_lower_hex_64(inventory_after_hex) {
        return Err(IoError::Hash(format!("expected lowercase 64-hex, got {inventory_after_hex:?}")));
    }
    Ok(format!("RND:{round}-{}", &inventory_after_hex[..SHORT_HEX_LEN]))
}
