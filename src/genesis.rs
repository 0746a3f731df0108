use crate::{
    block::{Block, GENESIS_ID, ZERO_DIGEST},
    crypto::{canonical_payload, hash_content, BlockContent},
    error::Result,
    storage::BlockStore,
};

use serde_json::{json, Value};

pub const GENESIS_MESSAGE: &str = "Genesis Block - Eatsimple order ledger";

pub fn genesis_payload() -> Value {
    json!({ "message": GENESIS_MESSAGE, "order_id": 0 })
}

/// Anchor block: id 0, zero predecessor, nonce 0, not mined.
pub fn genesis_block(timestamp: String) -> Result<Block> {
    let payload = genesis_payload();
    let current_hash = hash_content(&BlockContent::new(GENESIS_ID, &timestamp, &payload, ZERO_DIGEST))?;

    Ok(Block {
        id:            GENESIS_ID,
        order_id:      0,
        previous_hash: ZERO_DIGEST.to_string(),
        current_hash,
        block_data:    canonical_payload(&payload)?,
        timestamp,
        nonce:         0,
        difficulty:    0,
    })
}

/// Writes the genesis row if the chain is empty. Returns `true` when it did.
pub fn init_genesis(store: &BlockStore) -> Result<bool> {
    let _writer = store.lock_appends();
    if !store.is_empty() {
        return Ok(false);
    }

    let genesis = genesis_block(crate::utils::now_timestamp())?;
    store.insert(&genesis)?;

    tracing::info!(hash = %genesis.current_hash, "genesis block written");
    Ok(true)
}
