use crate::config::LedgerAppState;
use crate::handlers::{error_body, to_http_err, HttpError, get_block::models::BlockResponse};
use super::models::OrderBlockParams;
use axum::{
    Json,
    extract::{State, Query},
    http::StatusCode,
};

// latest block recorded for an order, via the `order_index` tree
pub async fn get_order_block_handler(
    State(state): State<LedgerAppState>,
    Query(params): Query<OrderBlockParams>,
) -> Result<Json<BlockResponse>, HttpError> {
    let blk = state
        .ledger
        .store()
        .find_by_order(params.order_id)
        .map_err(to_http_err)?
        .ok_or_else(|| error_body(
            StatusCode::NOT_FOUND,
            format!("order {} is not on the ledger", params.order_id),
        ))?;

    Ok(Json(BlockResponse::from(blk)))
}
