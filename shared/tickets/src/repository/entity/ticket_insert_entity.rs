use crate::TicketStatus;
use bson::DateTime;
use serde::Serialize;

#[derive(Serialize)]
pub struct TicketInsertEntity {
    pub owner_id: String,
    pub event_id: String,
    pub quantity: u32,
    pub total_price: f64,
    pub status: TicketStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub published_at: Option<DateTime>,
}
