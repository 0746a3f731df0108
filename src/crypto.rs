use crate::error::{LedgerError, Result};

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Bumped whenever the hashed field set or its encoding changes.
pub const CANONICAL_VERSION: u32 = 1;

/// Everything a block hash commits to.
///
/// Serialized with JCS (RFC 8785): keys sorted, ES6 number formatting,
/// minimal escaping. Two logically equal contents therefore always produce
/// the same bytes, whatever order the payload's keys were inserted in.
#[derive(Clone, Debug, Serialize)]
pub struct BlockContent<'a> {
    v:                 u32,
    pub index:         u64,
    pub timestamp:     &'a str,
    pub payload:       &'a Value,
    pub previous_hash: &'a str,
    pub nonce:         u64,
}

impl<'a> BlockContent<'a> {
    pub fn new(index: u64, timestamp: &'a str, payload: &'a Value, previous_hash: &'a str) -> Self {
        BlockContent { v: CANONICAL_VERSION, index, timestamp, payload, previous_hash, nonce: 0 }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }
}

pub fn canonical_bytes(content: &BlockContent<'_>) -> Result<Vec<u8>> {
    serde_jcs::to_vec(content)
        .map_err(|e| LedgerError::Serialization(format!("JCS encoding failed: {e}")))
}

/// Canonical text of a payload as it is stored in `block_data`.
pub fn canonical_payload(payload: &Value) -> Result<String> {
    serde_jcs::to_string(payload)
        .map_err(|e| LedgerError::Serialization(format!("JCS encoding failed: {e}")))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over the canonical encoding, lowercase hex.
pub fn hash_content(content: &BlockContent<'_>) -> Result<String> {
    Ok(sha256_hex(&canonical_bytes(content)?))
}

/// True when the first `difficulty` hex characters of `hash` are all `0`.
pub fn meets_difficulty(hash: &str, difficulty: u8) -> bool {
    let d = difficulty as usize;
    hash.len() >= d && hash.bytes().take(d).all(|b| b == b'0')
}
