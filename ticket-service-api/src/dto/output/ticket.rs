use serde::Serialize;
use tickets::TicketStatus;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct Ticket {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub quantity: u32,
    pub total_price: f64,
    pub status: TicketStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<tickets::Ticket> for Ticket {
    fn from(ticket: tickets::Ticket) -> Self {
        Self {
            id: ticket.id.to_hex(),
            user_id: ticket.owner_id,
            event_id: ticket.event_id,
            quantity: ticket.quantity,
            total_price: ticket.total_price,
            status: ticket.status,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bson::oid::ObjectId;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn ticket_json_serialize() {
        let id = ObjectId::new();
        let ticket = Ticket::from(tickets::Ticket {
            id,
            owner_id: "u1".to_string(),
            event_id: "evt-1".to_string(),
            quantity: 2,
            total_price: 49.98,
            status: TicketStatus::Pending,
            created_at: datetime!(2024-08-01 12:00 UTC),
            updated_at: datetime!(2024-08-01 12:00:01.5 UTC),
            published_at: None,
        });

        let json = serde_json::to_value(&ticket).unwrap();

        assert_eq!(
            json,
            json!({
                "id": id.to_hex(),
                "user_id": "u1",
                "event_id": "evt-1",
                "quantity": 2,
                "total_price": 49.98,
                "status": "pending",
                "created_at": "2024-08-01T12:00:00Z",
                "updated_at": "2024-08-01T12:00:01.5Z",
            })
        );
    }
}
