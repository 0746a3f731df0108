use crate::{
    block::{Block, ZERO_DIGEST},
    crypto::{canonical_payload, BlockContent},
    error::Result,
    genesis::init_genesis,
    mining::{check_difficulty, mine, DEFAULT_MAX_ATTEMPTS},
    order::{order_id_of, OrderRecord},
    storage::BlockStore,
    utils::now_timestamp,
    verify::{verify_chain, IntegrityReport},
};

use serde_json::Value;
use std::sync::{atomic::AtomicBool, Arc};
use tracing::{info, info_span};

/// Ledger controller.
///
/// Holds no chain state of its own: every append re-reads the tip from the
/// store, and appends through any clone of the same [`BlockStore`] are
/// serialized by the store's append lock.
#[derive(Clone)]
pub struct Ledger {
    store:        BlockStore,
    difficulty:   u8,
    max_attempts: u64,
    cancel:       Arc<AtomicBool>,
}

impl Ledger {
    /// Wraps `store`, writing the genesis block first if the chain is empty.
    pub fn open(store: BlockStore, difficulty: u8) -> Result<Self> {
        check_difficulty(difficulty)?;
        init_genesis(&store)?;

        Ok(Ledger {
            store,
            difficulty,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    /// Raising this flag aborts any mining in progress.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn append(&self, order: &OrderRecord) -> Result<Block> {
        self.append_document(order.to_document()?)
    }

    /// Mines and persists a block for `payload`, linked to the current tip.
    ///
    /// The payload is canonicalised before anything is read or locked, so an
    /// unencodable payload never touches the store.
    pub fn append_document(&self, payload: Value) -> Result<Block> {
        self.append_with(payload, |block| self.store.insert(block))
    }

    // `persist` runs under the append lock; if it fails the block is dropped
    fn append_with<F>(&self, payload: Value, persist: F) -> Result<Block>
    where
        F: FnOnce(&Block) -> Result<()>,
    {
        let order_id = order_id_of(&payload)?;
        let block_data = canonical_payload(&payload)?;

        let span = info_span!("append", order_id);
        let _enter = span.enter();

        let _writer = self.store.lock_appends();

        let tip = self.store.tip()?;
        let (id, previous_hash) = match &tip {
            Some(prev) => (prev.id + 1, prev.current_hash.clone()),
            None => (1, ZERO_DIGEST.to_string()),
        };
        let timestamp = now_timestamp();

        let mut content = BlockContent::new(id, &timestamp, &payload, &previous_hash);
        let mined = mine(&mut content, self.difficulty, self.max_attempts, &self.cancel)?;

        let block = Block {
            id,
            order_id,
            previous_hash,
            current_hash:  mined.hash,
            block_data,
            timestamp,
            nonce:         mined.nonce,
            difficulty:    self.difficulty,
        };
        persist(&block)?;

        info!(
            height   = block.id,
            hash     = %block.current_hash,
            nonce    = block.nonce,
            attempts = mined.attempts,
            "committing block"
        );
        Ok(block)
    }

    pub fn verify(&self) -> IntegrityReport {
        verify_chain(&self.store, self.difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        block::GENESIS_ID,
        error::LedgerError,
        mining::MAX_DIFFICULTY,
        order::OrderItem,
    };
    use serde_json::json;
    use std::{collections::HashSet, sync::atomic::Ordering, thread};

    fn order(order_id: u64, total: f64) -> OrderRecord {
        OrderRecord {
            order_id,
            customer_id:      7,
            customer_name:    "Astrid".into(),
            restaurant_id:    3,
            restaurant_name:  "Pizzeria Napoli".into(),
            total_amount:     total,
            items:            vec![OrderItem { item_name: "Margherita".into(), quantity: 1, price: total }],
            timestamp:        "2025-03-01 18:22:05.112233".into(),
            payment_method:   "card".into(),
            delivery_address: "Storgatan 12, Stockholm".into(),
            smart_contracts:  Some(json!({ "status": "processed" })),
        }
    }

    fn ledger() -> Ledger {
        Ledger::open(BlockStore::temporary().unwrap(), 2).unwrap()
    }

    #[test]
    fn first_block_links_to_genesis_and_is_mined() {
        let ledger = ledger();
        let genesis = ledger.store().get(GENESIS_ID).unwrap().unwrap();

        let block = ledger.append(&order(1, 23.50)).unwrap();
        assert_eq!(block.id, 1);
        assert_eq!(block.order_id, 1);
        assert_eq!(block.previous_hash, genesis.current_hash);
        assert!(block.current_hash.starts_with("00"));
        assert_eq!(block.difficulty, 2);
    }

    #[test]
    fn consecutive_blocks_are_linked() {
        let ledger = ledger();
        let a = ledger.append(&order(1, 23.50)).unwrap();
        let b = ledger.append(&order(2, 12.00)).unwrap();

        assert_eq!(b.previous_hash, a.current_hash);
        assert_eq!(b.id, a.id + 1);
        assert_eq!(ledger.store().tip().unwrap().unwrap(), b);
    }

    #[test]
    fn empty_store_without_genesis_starts_from_the_zero_digest() {
        let store = BlockStore::temporary().unwrap();
        let ledger = Ledger { store: store.clone(), difficulty: 1, max_attempts: 10_000, cancel: Arc::new(AtomicBool::new(false)) };

        let block = ledger.append(&order(5, 9.0)).unwrap();
        assert_eq!(block.id, 1);
        assert_eq!(block.previous_hash, ZERO_DIGEST);
    }

    #[test]
    fn unencodable_payload_leaves_the_store_untouched() {
        let ledger = ledger();
        let err = ledger.append(&order(1, f64::NAN)).unwrap_err();
        assert!(matches!(err, LedgerError::Serialization(_)));

        let err = ledger.append_document(json!({ "total_amount": 1.0 })).unwrap_err();
        assert!(matches!(err, LedgerError::Serialization(_)));
        assert_eq!(ledger.store().len(), 1);
    }

    #[test]
    fn cancelled_mining_writes_nothing() {
        let ledger = ledger();
        ledger.cancel_handle().store(true, Ordering::Relaxed);
        assert!(matches!(ledger.append(&order(1, 5.0)), Err(LedgerError::MiningCancelled)));
        assert_eq!(ledger.store().len(), 1);
    }

    #[test]
    fn failed_write_leaves_the_chain_unchanged() {
        let ledger = ledger();
        let before = ledger.store().tip().unwrap().unwrap();

        let err = ledger
            .append_with(order(1, 5.0).to_document().unwrap(), |_| {
                Err(LedgerError::StorageUnavailable("io error: no space left on device".into()))
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::StorageUnavailable(_)));
        assert_eq!(ledger.store().len(), 1);
        assert_eq!(ledger.store().tip().unwrap().unwrap(), before);
        assert!(ledger.store().find_by_order(1).unwrap().is_none());

        // the next append still links to the untouched tip
        let block = ledger.append(&order(1, 5.0)).unwrap();
        assert_eq!(block.id, 1);
        assert_eq!(block.previous_hash, before.current_hash);
    }

    #[test]
    fn difficulty_over_the_ceiling_is_refused_at_open() {
        let res = Ledger::open(BlockStore::temporary().unwrap(), MAX_DIFFICULTY + 1);
        assert!(matches!(res, Err(LedgerError::DifficultyTooHigh { .. })));
    }

    #[test]
    fn two_controllers_on_one_store_share_the_chain() {
        let store = BlockStore::temporary().unwrap();
        let first = Ledger::open(store.clone(), 2).unwrap();
        let second = Ledger::open(store, 2).unwrap();

        let a = first.append(&order(1, 1.0)).unwrap();
        let b = second.append(&order(2, 2.0)).unwrap();
        assert_eq!(b.previous_hash, a.current_hash);
    }

    #[test]
    fn concurrent_appends_keep_a_single_chain() {
        let ledger = ledger();
        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let ledger = ledger.clone();
                thread::spawn(move || {
                    (0..5u64)
                        .map(|i| ledger.append(&order(t * 100 + i + 1, 10.0)).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let blocks: Vec<Block> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();

        let parents: HashSet<_> = blocks.iter().map(|b| b.previous_hash.clone()).collect();
        assert_eq!(parents.len(), blocks.len());
        assert_eq!(ledger.store().len(), 41);
        assert!(ledger.verify().overall_valid);
    }
}
