use serde::Serialize;

#[derive(Serialize)]
pub struct ChainTip {
    pub height:       u64,
    pub current_hash: String,
    pub difficulty:   u8,
}
