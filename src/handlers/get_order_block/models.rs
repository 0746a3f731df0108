use serde::Deserialize;

#[derive(Deserialize)]
pub struct OrderBlockParams {
    pub order_id: u64,
}
