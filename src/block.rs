use crate::{
    crypto::BlockContent,
    error::{LedgerError, Result},
};

use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Predecessor of the genesis block.
pub const ZERO_DIGEST: &str = "0000000000000000000000000000000000000000000000000000000000000000";
pub const GENESIS_ID: u64 = 0;

/// One persisted ledger entry. `id` doubles as the hashed `index`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id:            u64,
    pub order_id:      u64,
    pub previous_hash: String,
    pub current_hash:  String,
    pub block_data:    String,   // canonical JSON of the order payload
    pub timestamp:     String,
    pub nonce:         u64,
    pub difficulty:    u8,       // leading hex zeros required when mined
}

// on-disk value; the id lives in the key
#[derive(Serialize, Deserialize)]
struct Row {
    order_id:      u64,
    previous_hash: String,
    current_hash:  String,
    block_data:    String,
    timestamp:     String,
    nonce:         u64,
    difficulty:    u8,
}

impl Block {
    pub fn is_genesis(&self) -> bool {
        self.id == GENESIS_ID
    }

    pub fn payload(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.block_data)
    }

    /// Hash input rebuilt from what was stored, given the parsed payload.
    pub fn content<'a>(&'a self, payload: &'a Value) -> BlockContent<'a> {
        BlockContent::new(self.id, &self.timestamp, payload, &self.previous_hash)
            .with_nonce(self.nonce)
    }
}

pub fn block_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

pub fn decode_key(key: &[u8]) -> Result<u64> {
    if key.len() != 8 {
        return Err(LedgerError::CorruptRow {
            id:     u64::MAX,
            reason: format!("key is {} bytes, expected 8", key.len()),
        });
    }
    Ok(BigEndian::read_u64(key))
}

pub fn encode_row(block: &Block) -> Result<Vec<u8>> {
    let row = Row {
        order_id:      block.order_id,
        previous_hash: block.previous_hash.clone(),
        current_hash:  block.current_hash.clone(),
        block_data:    block.block_data.clone(),
        timestamp:     block.timestamp.clone(),
        nonce:         block.nonce,
        difficulty:    block.difficulty,
    };
    Ok(encode_to_vec(&row, standard())?)
}

pub fn decode_row(id: u64, buf: &[u8]) -> Result<Block> {
    let (row, read): (Row, usize) = decode_from_slice(buf, standard())
        .map_err(|e| LedgerError::CorruptRow { id, reason: e.to_string() })?;
    if read != buf.len() {
        return Err(LedgerError::CorruptRow {
            id,
            reason: format!("{} trailing bytes after row", buf.len() - read),
        });
    }

    Ok(Block {
        id,
        order_id:      row.order_id,
        previous_hash: row.previous_hash,
        current_hash:  row.current_hash,
        block_data:    row.block_data,
        timestamp:     row.timestamp,
        nonce:         row.nonce,
        difficulty:    row.difficulty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> Block {
        Block {
            id:            5,
            order_id:      42,
            previous_hash: "00aa".into(),
            current_hash:  "00bb".into(),
            block_data:    r#"{"order_id":42}"#.into(),
            timestamp:     "2025-03-01T18:22:05.112Z".into(),
            nonce:         311,
            difficulty:    2,
        }
    }

    #[test]
    fn row_keeps_every_field_but_the_id() {
        let bytes = encode_row(&block()).unwrap();
        assert_eq!(decode_row(5, &bytes).unwrap(), block());
        assert_eq!(decode_row(6, &bytes).unwrap().id, 6);
    }

    #[test]
    fn truncated_rows_are_corrupt() {
        let bytes = encode_row(&block()).unwrap();
        let err = decode_row(5, &bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, LedgerError::CorruptRow { id: 5, .. }));
    }

    #[test]
    fn keys_sort_by_id() {
        assert!(block_key(255) < block_key(256));
        assert_eq!(decode_key(&block_key(256)).unwrap(), 256);
        assert!(decode_key(b"abc").is_err());
    }

    #[test]
    fn zero_digest_is_64_chars() {
        assert_eq!(ZERO_DIGEST.len(), 64);
        assert!(ZERO_DIGEST.bytes().all(|b| b == b'0'));
    }
}
