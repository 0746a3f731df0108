use crate::config::LedgerAppState;
use crate::handlers::{to_http_err, HttpError};
use super::models::{ListBlocksReq, BlockSummary};
use axum::{
    Json,
    extract::{State, Query}
};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

pub async fn get_list_blocks_handler(
    State(state): State<LedgerAppState>,
    Query(params): Query<ListBlocksReq>,
) -> Result<Json<Vec<BlockSummary>>, HttpError> {
    let start = params.start.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    let out = state
        .ledger
        .store()
        .list(start, limit)
        .map_err(to_http_err)?
        .into_iter()
        .map(|b| BlockSummary {
            id:           b.id,
            order_id:     b.order_id,
            current_hash: b.current_hash,
            timestamp:    b.timestamp,
        })
        .collect();

    Ok(Json(out))
}
