use super::to_timestamp;
use crate::Ticket;
use prost::Message;

///
/// Wire format of the notification published after a ticket was confirmed
///
#[derive(Clone, PartialEq, prost::Message)]
pub struct TicketConfirmedProtobuf {
    #[prost(string, tag = "1")]
    pub ticket_id: String,
    #[prost(string, tag = "2")]
    pub owner_id: String,
    #[prost(string, tag = "3")]
    pub event_id: String,
    #[prost(uint32, tag = "4")]
    pub quantity: u32,
    #[prost(double, tag = "5")]
    pub total_price: f64,
    #[prost(message, optional, tag = "6")]
    pub confirmed_at: Option<prost_types::Timestamp>,
}

impl TicketConfirmedProtobuf {
    pub fn encode_ticket(ticket: &Ticket) -> Vec<u8> {
        Self {
            ticket_id: ticket.id.to_hex(),
            owner_id: ticket.owner_id.clone(),
            event_id: ticket.event_id.clone(),
            quantity: ticket.quantity,
            total_price: ticket.total_price,
            confirmed_at: Some(to_timestamp(ticket.updated_at)),
        }
        .encode_to_vec()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::TicketStatus;
    use bson::oid::ObjectId;
    use time::macros::datetime;

    #[test]
    fn confirmed_at_is_updated_at() {
        let ticket = Ticket {
            id: ObjectId::new(),
            owner_id: "u1".to_string(),
            event_id: "evt-1".to_string(),
            quantity: 2,
            total_price: 49.98,
            status: TicketStatus::Confirmed,
            created_at: datetime!(2024-08-01 12:00 UTC),
            updated_at: datetime!(2024-08-01 12:00:01 UTC),
            published_at: None,
        };

        let bytes = TicketConfirmedProtobuf::encode_ticket(&ticket);
        let message = TicketConfirmedProtobuf::decode(bytes.as_slice()).unwrap();

        assert_eq!(message.ticket_id, ticket.id.to_hex());
        assert_eq!(message.owner_id, "u1");
        assert_eq!(message.confirmed_at, Some(to_timestamp(ticket.updated_at)));
    }
}
