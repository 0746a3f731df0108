use crate::config::LedgerAppState;
use crate::handlers::{error_body, to_http_err, HttpError};
use super::models::ChainTip;
use axum::{
    Json,
    http::StatusCode,
    extract::State,
};

pub async fn get_chain_tip_handler(
    State(state): State<LedgerAppState>,
) -> Result<Json<ChainTip>, HttpError> {
    let blk = state
        .ledger
        .store()
        .tip()
        .map_err(to_http_err)?
        .ok_or_else(|| error_body(StatusCode::NOT_FOUND, "no blocks in chain"))?;

    Ok(Json(ChainTip {
        height:       blk.id,
        current_hash: blk.current_hash,
        difficulty:   state.cfg.difficulty,
    }))
}
