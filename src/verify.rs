use crate::{
    block::{decode_key, Block, ZERO_DIGEST},
    crypto::{hash_content, meets_difficulty},
    error::{LedgerError, Result},
    order::order_id_of,
    storage::BlockStore,
};

use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockStatus {
    Valid,
    Tampered,
}

/// Why a block was flagged. Link and hash mismatches are kept apart: the
/// first means the block was spliced in, the second that its own content
/// changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    LinkMismatch { expected: String, found: String },
    HashMismatch { expected: String, found: String },
    InsufficientWork { difficulty: u8 },
    OrderIdMismatch { expected: u64, found: u64 },
    Unreadable { reason: String },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::LinkMismatch { expected, found } =>
                write!(f, "Previous hash mismatch. Expected: {expected}, Got: {found}"),
            Issue::HashMismatch { expected, found } =>
                write!(f, "Hash mismatch. Expected: {expected}, Got: {found}"),
            Issue::InsufficientWork { difficulty } =>
                write!(f, "Hash does not carry {difficulty} leading zeros"),
            Issue::OrderIdMismatch { expected, found } =>
                write!(f, "Order id mismatch. Payload: {expected}, Recorded: {found}"),
            Issue::Unreadable { reason } =>
                write!(f, "Block data parsing error: {reason}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    pub block_id: u64,
    pub order_id: Option<u64>,
    pub status:   BlockStatus,
    pub issues:   Vec<Issue>,
}

impl BlockReport {
    fn new(block_id: u64, order_id: Option<u64>, issues: Vec<Issue>) -> Self {
        let status = if issues.is_empty() { BlockStatus::Valid } else { BlockStatus::Tampered };
        BlockReport { block_id, order_id, status, issues }
    }

    pub fn is_tampered(&self) -> bool {
        self.status == BlockStatus::Tampered
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub overall_valid: bool,
    pub message:       String,
    pub tampered:      usize,
    pub blocks:        Vec<BlockReport>,
}

/// `expected_previous` is the stored hash of the predecessor; `None` skips
/// the link check. Non-genesis blocks must carry at least `min_difficulty`
/// leading zeros whatever difficulty their row records.
fn check_block(block: &Block, expected_previous: Option<&str>, min_difficulty: u8) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let Some(expected) = expected_previous {
        if block.previous_hash != expected {
            issues.push(Issue::LinkMismatch {
                expected: expected.to_string(),
                found:    block.previous_hash.clone(),
            });
        }
    }

    match block.payload() {
        Ok(payload) => {
            match hash_content(&block.content(&payload)) {
                Ok(recomputed) if recomputed != block.current_hash => {
                    issues.push(Issue::HashMismatch { expected: recomputed, found: block.current_hash.clone() });
                }
                Ok(_) => {}
                Err(e) => issues.push(Issue::Unreadable { reason: e.to_string() }),
            }
            // the order_id column is outside the hash
            match order_id_of(&payload) {
                Ok(expected) if expected != block.order_id => {
                    issues.push(Issue::OrderIdMismatch { expected, found: block.order_id });
                }
                Ok(_) => {}
                Err(e) => issues.push(Issue::Unreadable { reason: e.to_string() }),
            }
        }
        Err(e) => issues.push(Issue::Unreadable { reason: e.to_string() }),
    }

    if !block.is_genesis() {
        let required = block.difficulty.max(min_difficulty);
        if !meets_difficulty(&block.current_hash, required) {
            issues.push(Issue::InsufficientWork { difficulty: required });
        }
    }

    issues
}

/// Replays the whole chain in insertion order.
///
/// Never aborts on a bad block: each block is compared against the
/// *stored* hash of its predecessor, so one altered block is flagged alone
/// instead of breaking every link after it. A storage failure ends the scan
/// and is reported as a failed check.
pub fn verify_chain(store: &BlockStore, min_difficulty: u8) -> IntegrityReport {
    verify_rows(store.scan(), min_difficulty)
}

/// Same as [`verify_chain`] over any source of raw rows, shaped like
/// [`BlockStore::scan`].
pub fn verify_rows<I>(rows: I, min_difficulty: u8) -> IntegrityReport
where
    I: IntoIterator<Item = Result<(Vec<u8>, Result<Block>)>>,
{
    let mut blocks = Vec::new();
    // None after an unreadable row: its stored hash is unknown
    let mut expected_previous: Option<String> = Some(ZERO_DIGEST.to_string());

    for item in rows {
        let (key, decoded) = match item {
            Ok(row) => row,
            Err(e) => {
                error!(error = %e, "block store read failed during verification");
                return storage_failure(e, blocks);
            }
        };

        let report = match decoded {
            Ok(block) => {
                let issues = check_block(&block, expected_previous.as_deref(), min_difficulty);
                expected_previous = Some(block.current_hash.clone());
                BlockReport::new(block.id, Some(block.order_id), issues)
            }
            Err(e) => {
                expected_previous = None;
                let block_id = decode_key(&key).unwrap_or(u64::MAX);
                let reason = match e {
                    LedgerError::CorruptRow { reason, .. } => reason,
                    other => other.to_string(),
                };
                BlockReport::new(block_id, None, vec![Issue::Unreadable { reason }])
            }
        };

        if report.is_tampered() {
            warn!(block_id = report.block_id, order_id = ?report.order_id, issues = report.issues.len(), "tampered block");
        }
        blocks.push(report);
    }

    if blocks.is_empty() {
        return IntegrityReport {
            overall_valid: false,
            message:       "Ledger has no genesis block.".into(),
            tampered:      0,
            blocks,
        };
    }

    let tampered = blocks.iter().filter(|b| b.is_tampered()).count();
    let (overall_valid, message) = if tampered == 0 {
        (true, format!("Ledger integrity verified successfully ({} blocks).", blocks.len()))
    } else {
        (false, format!("Ledger integrity compromised. {tampered} blocks tampered."))
    };
    info!(blocks = blocks.len(), tampered, "ledger verified");

    IntegrityReport { overall_valid, message, tampered, blocks }
}

fn storage_failure(e: LedgerError, blocks: Vec<BlockReport>) -> IntegrityReport {
    let tampered = blocks.iter().filter(|b| b.is_tampered()).count();
    IntegrityReport {
        overall_valid: false,
        message: format!("Unable to verify ledger integrity: {e}"),
        tampered,
        blocks,
    }
}
