use serde::{Serialize, Deserialize};

#[derive(Deserialize)]
pub struct ListBlocksReq {
    pub start: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct BlockSummary {
    pub id:           u64,
    pub order_id:     u64,
    pub current_hash: String,
    pub timestamp:    String,
}
