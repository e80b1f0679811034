use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PurchaseRequest {
    #[serde(alias = "eventID")]
    pub event_id: String,

    /// Signed so that out of range values are validation errors
    pub quantity: i64,

    #[serde(alias = "totalPrice")]
    pub total_price: f64,
}
