use crate::{
    block::{block_key, decode_key, decode_row, encode_row, Block, GENESIS_ID},
    error::{LedgerError, Result},
};

use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError, Transactional,
};
use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{error, info};

pub const CHAIN_TREE: &str = "chain";
pub const ORDER_INDEX_TREE: &str = "order_index";

/// Durable, append-only block table on sled.
///
/// Keys in `chain` are big-endian ids, so iteration order is insertion
/// order. Clones share the same trees and the same append lock.
#[derive(Clone)]
pub struct BlockStore {
    db:          sled::Db,
    chain:       sled::Tree,
    orders:      sled::Tree,
    append_lock: Arc<Mutex<()>>,
}

impl BlockStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "cannot open block store");
            LedgerError::from(e)
        })?;
        info!(path = %path.display(), "block store opened");
        Self::from_db(db)
    }

    /// In-memory store that is discarded on drop.
    pub fn temporary() -> Result<Self> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    pub fn from_db(db: sled::Db) -> Result<Self> {
        let chain = db.open_tree(CHAIN_TREE)?;
        let orders = db.open_tree(ORDER_INDEX_TREE)?;
        Ok(BlockStore { db, chain, orders, append_lock: Arc::new(Mutex::new(())) })
    }

    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Most recently persisted block.
    pub fn tip(&self) -> Result<Option<Block>> {
        match self.chain.last()? {
            Some((k, v)) => Ok(Some(decode_row(decode_key(&k)?, &v)?)),
            None => Ok(None),
        }
    }

    pub fn get(&self, id: u64) -> Result<Option<Block>> {
        match self.chain.get(block_key(id))? {
            Some(v) => Ok(Some(decode_row(id, &v)?)),
            None => Ok(None),
        }
    }

    /// Latest block recording `order_id`.
    pub fn find_by_order(&self, order_id: u64) -> Result<Option<Block>> {
        match self.orders.get(order_id.to_be_bytes())? {
            Some(id) => self.get(decode_key(&id)?),
            None => Ok(None),
        }
    }

    /// Blocks in insertion order, skipping `start` and yielding at most `limit`.
    pub fn list(&self, start: usize, limit: usize) -> Result<Vec<Block>> {
        let mut out = Vec::with_capacity(limit.min(1024));
        for item in self.chain.iter().skip(start).take(limit) {
            let (k, v) = item?;
            out.push(decode_row(decode_key(&k)?, &v)?);
        }
        Ok(out)
    }

    /// Raw scan in insertion order. The outer `Result` is a storage failure,
    /// the inner one an unreadable row.
    pub fn scan(&self) -> impl Iterator<Item = Result<(Vec<u8>, Result<Block>)>> + '_ {
        self.chain.iter().map(|item| -> Result<(Vec<u8>, Result<Block>)> {
            let (k, v) = item?;
            let decoded = decode_key(&k).and_then(|id| decode_row(id, &v));
            Ok((k.to_vec(), decoded))
        })
    }

    /// Appends `block` and its order-index entry in one transaction, then
    /// flushes. Fails with [`LedgerError::TipMoved`] if the id is taken.
    pub fn insert(&self, block: &Block) -> Result<()> {
        let key = block_key(block.id);
        let value = encode_row(block)?;
        let order_key = block.order_id.to_be_bytes();

        (&self.chain, &self.orders)
            .transaction(|(chain, orders)| -> ConflictableTransactionResult<(), LedgerError> {
                if chain.get(&key[..])?.is_some() {
                    return Err(ConflictableTransactionError::Abort(LedgerError::TipMoved(block.id)));
                }
                chain.insert(&key[..], value.as_slice())?;
                if block.id != GENESIS_ID {
                    orders.insert(&order_key[..], &key[..])?;
                }
                Ok(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(e) => e,
                TransactionError::Storage(e) => LedgerError::from(e),
            })?;

        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn lock_appends(&self) -> MutexGuard<'_, ()> {
        // a writer that panicked mid-append never reached the transaction,
        // so the chain is still consistent
        self.append_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
