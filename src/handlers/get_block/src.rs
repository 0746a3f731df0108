use crate::config::LedgerAppState;
use crate::handlers::{error_body, to_http_err, HttpError};
use super::models::{BlockResponse, BlockParams};
use axum::{
    Json,
    extract::{State, Query},
    http::StatusCode,
};

pub async fn get_block_handler(
    State(state): State<LedgerAppState>,
    Query(params): Query<BlockParams>,
) -> Result<Json<BlockResponse>, HttpError> {
    let blk = state
        .ledger
        .store()
        .get(params.id)
        .map_err(to_http_err)?
        .ok_or_else(|| error_body(StatusCode::NOT_FOUND, format!("block {} not found", params.id)))?;

    Ok(Json(BlockResponse::from(blk)))
}
