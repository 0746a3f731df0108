pub mod block;          // persisted block row, genesis constants
pub mod config;         // loads ledger.toml, shared axum state
pub mod crypto;         // canonical (JCS) encoding, sha256 block hash
pub mod error;          // LedgerError
pub mod genesis;        // one-time genesis bootstrap
pub mod handlers;       // handlers for Axum API
pub mod ledger;         // append: read tip, mine, persist
pub mod mining;         // proof-of-work search
pub mod order;          // order-completion record handed to the ledger
pub mod server;         // router, plain/TLS serving
pub mod storage;        // sled block store
pub mod utils;          // timestamps, PEM loading
pub mod verify;         // chain replay and tamper report

pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use order::{OrderItem, OrderRecord};
pub use storage::BlockStore;
pub use verify::IntegrityReport;
