use crate::error::{LedgerError, Result};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_name: String,
    pub quantity:  u32,
    pub price:     f64,
}

// Finalized order handed over by the order-completion flow. The ledger only
// reads `order_id`; everything else is carried as an opaque document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id:         u64,
    pub customer_id:      u64,
    pub customer_name:    String,
    pub restaurant_id:    u64,
    pub restaurant_name:  String,
    pub total_amount:     f64,
    pub items:            Vec<OrderItem>,
    pub timestamp:        String,
    #[serde(default = "default_payment_method")]
    pub payment_method:   String,              // "card" | "mpesa" | "cash"
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_contracts:  Option<Value>,       // contract execution result, if any
}

fn default_payment_method() -> String {
    "cash".to_string()
}

impl OrderRecord {
    /// Converts the record into the JSON document stored in a block.
    ///
    /// Fails with [`LedgerError::Serialization`] when an amount is NaN or
    /// infinite, since those have no canonical JSON form.
    pub fn to_document(&self) -> Result<Value> {
        if !self.total_amount.is_finite() {
            return Err(LedgerError::Serialization(format!(
                "order {}: total_amount is not a finite number",
                self.order_id
            )));
        }
        if let Some(item) = self.items.iter().find(|i| !i.price.is_finite()) {
            return Err(LedgerError::Serialization(format!(
                "order {}: price of `{}` is not a finite number",
                self.order_id, item.item_name
            )));
        }

        Ok(serde_json::to_value(self)?)
    }
}

/// Pulls the indexing key out of a ledger document.
pub fn order_id_of(doc: &Value) -> Result<u64> {
    doc.get("order_id")
        .and_then(Value::as_u64)
        .ok_or_else(|| LedgerError::Serialization("payload carries no integer `order_id`".into()))
}
