use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// sled could not be opened, read or written.
    #[error("block store unavailable: {0}")]
    StorageUnavailable(String),

    /// The payload (or a row built from it) has no canonical encoding.
    #[error("payload cannot be canonically encoded: {0}")]
    Serialization(String),

    #[error("stored block {id} is unreadable: {reason}")]
    CorruptRow { id: u64, reason: String },

    #[error("difficulty {requested} exceeds the ceiling of {max}")]
    DifficultyTooHigh { requested: u8, max: u8 },

    #[error("no valid nonce found after {attempts} attempts")]
    MiningExhausted { attempts: u64 },

    #[error("mining cancelled")]
    MiningCancelled,

    /// Another writer claimed the id this append computed.
    #[error("chain tip moved during append (block {0} already exists)")]
    TipMoved(u64),
}

impl From<sled::Error> for LedgerError {
    fn from(e: sled::Error) -> Self {
        LedgerError::StorageUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

impl From<bincode::error::EncodeError> for LedgerError {
    fn from(e: bincode::error::EncodeError) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
