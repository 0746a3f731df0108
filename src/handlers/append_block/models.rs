use crate::block::Block;
use serde::Serialize;

// confirmation shown to the customer once the order is on the ledger
#[derive(Serialize)]
pub struct AppendResp {
    pub index:         u64,
    pub timestamp:     String,
    pub previous_hash: String,
    pub current_hash:  String,
    pub nonce:         u64,
}

impl From<Block> for AppendResp {
    fn from(b: Block) -> Self {
        AppendResp {
            index:         b.id,
            timestamp:     b.timestamp,
            previous_hash: b.previous_hash,
            current_hash:  b.current_hash,
            nonce:         b.nonce,
        }
    }
}
