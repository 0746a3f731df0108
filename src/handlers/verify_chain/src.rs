use crate::{
    config::LedgerAppState,
    handlers::{join_err, HttpError},
};
use super::models::VerifyResp;
use axum::{
    Json,
    extract::State,
};

// a broken chain is still a 200; the verdict is in the body
pub async fn verify_chain_handler(
    State(state): State<LedgerAppState>,
) -> Result<Json<VerifyResp>, HttpError> {
    let ledger = state.ledger.clone();
    let report = tokio::task::spawn_blocking(move || ledger.verify())
        .await
        .map_err(join_err)?;

    Ok(Json(VerifyResp::from(report)))
}
