use crate::{
    config::LedgerAppState,
    handlers::{join_err, to_http_err, HttpError},
    order::OrderRecord,
};
use super::models::AppendResp;
use axum::{
    extract::{State, Json},
    http::StatusCode,
};

pub async fn append_block_handler(
    State(state): State<LedgerAppState>,
    Json(order): Json<OrderRecord>,
) -> Result<(StatusCode, Json<AppendResp>), HttpError> {
    let ledger = state.ledger.clone();

    // mining and the sled flush are blocking work
    let blk = tokio::task::spawn_blocking(move || ledger.append(&order))
        .await
        .map_err(join_err)?
        .map_err(to_http_err)?;

    Ok((StatusCode::CREATED, Json(AppendResp::from(blk))))
}
