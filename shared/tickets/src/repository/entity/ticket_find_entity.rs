use crate::{Ticket, TicketStatus};
use bson::{oid::ObjectId, DateTime};
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Deserialize)]
pub struct TicketFindEntity {
    pub _id: ObjectId,
    pub owner_id: String,
    pub event_id: String,
    pub quantity: u32,
    pub total_price: f64,
    pub status: TicketStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,

    #[serde(default)]
    pub published_at: Option<DateTime>,
}

impl From<TicketFindEntity> for Ticket {
    fn from(entity: TicketFindEntity) -> Self {
        Self {
            id: entity._id,
            owner_id: entity.owner_id,
            event_id: entity.event_id,
            quantity: entity.quantity,
            total_price: entity.total_price,
            status: entity.status,
            created_at: OffsetDateTime::from(entity.created_at),
            updated_at: OffsetDateTime::from(entity.updated_at),
            published_at: entity.published_at.map(OffsetDateTime::from),
        }
    }
}
