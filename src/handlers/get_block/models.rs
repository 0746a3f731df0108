use crate::block::Block;
use serde::{Serialize, Deserialize};
use serde_json::Value;

#[derive(Serialize)]
pub struct BlockResponse {
    pub id:            u64,
    pub order_id:      u64,
    pub previous_hash: String,
    pub current_hash:  String,
    pub timestamp:     String,
    pub nonce:         u64,
    pub difficulty:    u8,
    pub payload:       Value,
}

impl From<Block> for BlockResponse {
    fn from(b: Block) -> Self {
        // an unparsable payload is shown raw; /verify reports it
        let payload = b.payload()
            .unwrap_or_else(|_| Value::String(b.block_data.clone()));

        BlockResponse {
            id:            b.id,
            order_id:      b.order_id,
            previous_hash: b.previous_hash,
            current_hash:  b.current_hash,
            timestamp:     b.timestamp,
            nonce:         b.nonce,
            difficulty:    b.difficulty,
            payload,
        }
    }
}

#[derive(Deserialize)]
pub struct BlockParams {
    pub id: u64,
}
