use crate::TicketStatus;
use bson::oid::ObjectId;
use time::OffsetDateTime;

/// Largest number of seats bought with a single ticket
pub const MAX_QUANTITY: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: ObjectId,
    pub owner_id: String,
    pub event_id: String,
    pub quantity: u32,
    pub total_price: f64,
    pub status: TicketStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    /// Set once the broker confirmed the purchase event
    pub published_at: Option<OffsetDateTime>,
}

///
/// Validated fields of a ticket that is about to be created.
/// New tickets always start as [TicketStatus::Pending]
///
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub owner_id: String,
    pub event_id: String,
    pub quantity: u32,
    pub total_price: f64,
    pub created_at: OffsetDateTime,
}
