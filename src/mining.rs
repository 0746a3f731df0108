use crate::{
    crypto::{hash_content, meets_difficulty, BlockContent},
    error::{LedgerError, Result},
};

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

pub const DEFAULT_DIFFICULTY: u8 = 2;
/// Each extra hex zero multiplies the expected search by 16.
pub const MAX_DIFFICULTY: u8 = 6;
pub const DEFAULT_MAX_ATTEMPTS: u64 = 50_000_000;

// cancellation flag is polled once per this many nonces
const CANCEL_POLL_INTERVAL: u64 = 4096;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mined {
    pub nonce:    u64,
    pub hash:     String,
    pub attempts: u64,
}

pub fn check_difficulty(difficulty: u8) -> Result<()> {
    if difficulty > MAX_DIFFICULTY {
        return Err(LedgerError::DifficultyTooHigh { requested: difficulty, max: MAX_DIFFICULTY });
    }
    Ok(())
}

/// Proof-of-work search: bumps `content.nonce` from its current value until
/// the hash starts with `difficulty` zero hex digits.
///
/// On success `content.nonce` is left at the winning value. The search gives
/// up after `max_attempts` hashes or as soon as `cancel` is raised.
pub fn mine(
    content: &mut BlockContent<'_>,
    difficulty: u8,
    max_attempts: u64,
    cancel: &AtomicBool,
) -> Result<Mined> {
    check_difficulty(difficulty)?;

    let mut attempts = 0u64;
    loop {
        if attempts >= max_attempts {
            return Err(LedgerError::MiningExhausted { attempts });
        }
        if attempts % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            return Err(LedgerError::MiningCancelled);
        }

        let hash = hash_content(content)?;
        attempts += 1;
        if meets_difficulty(&hash, difficulty) {
            debug!(index = content.index, nonce = content.nonce, attempts, "block mined");
            return Ok(Mined { nonce: content.nonce, hash, attempts });
        }

        content.nonce = content.nonce.checked_add(1)
            .ok_or(LedgerError::MiningExhausted { attempts })?;
    }
}
