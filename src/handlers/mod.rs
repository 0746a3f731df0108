use crate::error::LedgerError;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub mod append_block;
pub mod get_block;
pub mod get_chain_tip;
pub mod get_list_blocks;
pub mod get_order_block;
pub mod verify_chain;

pub type HttpError = (StatusCode, Json<Value>);

pub(crate) fn error_body(status: StatusCode, msg: impl std::fmt::Display) -> HttpError {
    (status, Json(json!({ "error": msg.to_string() })))
}

pub(crate) fn to_http_err(e: LedgerError) -> HttpError {
    let status = match &e {
        LedgerError::StorageUnavailable(_)     => StatusCode::SERVICE_UNAVAILABLE,
        LedgerError::Serialization(_)          => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::TipMoved(_)               => StatusCode::CONFLICT,
        LedgerError::MiningExhausted { .. }
        | LedgerError::MiningCancelled
        | LedgerError::DifficultyTooHigh { .. } => StatusCode::SERVICE_UNAVAILABLE,
        LedgerError::CorruptRow { .. }         => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %e, "ledger request failed");
    }
    error_body(status, e)
}

pub(crate) fn join_err(e: tokio::task::JoinError) -> HttpError {
    tracing::error!(error = %e, "ledger worker task failed");
    error_body(StatusCode::INTERNAL_SERVER_ERROR, "ledger worker task failed")
}
