use super::{from_timestamp, to_timestamp};
use crate::{Ticket, MAX_QUANTITY};
use bson::oid::ObjectId;
use prost::Message;
use time::OffsetDateTime;

///
/// Wire format of the event published after a ticket was purchased
///
#[derive(Clone, PartialEq, prost::Message)]
pub struct PurchaseEventProtobuf {
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
    pub published_at: Option<prost_types::Timestamp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseEvent {
    pub ticket_id: ObjectId,
    pub owner_id: String,
    pub event_id: String,
    pub quantity: u32,
    pub total_price: f64,
    pub published_at: OffsetDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum PurchaseEventError {
    #[error("failed to decode purchase event: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("invalid purchase event: {0}")]
    Invalid(&'static str),
}

impl PurchaseEvent {
    pub fn from_ticket(ticket: &Ticket, published_at: OffsetDateTime) -> Self {
        Self {
            ticket_id: ticket.id,
            owner_id: ticket.owner_id.clone(),
            event_id: ticket.event_id.clone(),
            quantity: ticket.quantity,
            total_price: ticket.total_price,
            published_at,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        PurchaseEventProtobuf {
            ticket_id: self.ticket_id.to_hex(),
            owner_id: self.owner_id.clone(),
            event_id: self.event_id.clone(),
            quantity: self.quantity,
            total_price: self.total_price,
            published_at: Some(to_timestamp(self.published_at)),
        }
        .encode_to_vec()
    }

    ///
    /// Decodes and validates event
    ///
    /// ### Errors
    /// - [PurchaseEventError::Decode] when bytes are not a protobuf message
    /// - [PurchaseEventError::Invalid] when any field is missing or outside of range accepted on purchase
    ///
    pub fn decode(bytes: &[u8]) -> Result<Self, PurchaseEventError> {
        let message = PurchaseEventProtobuf::decode(bytes)?;

        let ticket_id = ObjectId::parse_str(&message.ticket_id)
            .map_err(|_| PurchaseEventError::Invalid("ticket_id is not valid id"))?;
        if message.owner_id.is_empty() {
            return Err(PurchaseEventError::Invalid("owner_id is empty"));
        }
        if message.event_id.trim().is_empty() {
            return Err(PurchaseEventError::Invalid("event_id is empty"));
        }
        if !(1..=MAX_QUANTITY).contains(&message.quantity) {
            return Err(PurchaseEventError::Invalid("quantity is out of range"));
        }
        if !message.total_price.is_finite() || message.total_price < 0.0 {
            return Err(PurchaseEventError::Invalid("total_price is not a non-negative number"));
        }
        let published_at = message
            .published_at
            .as_ref()
            .and_then(from_timestamp)
            .ok_or(PurchaseEventError::Invalid("published_at is missing"))?;

        Ok(Self {
            ticket_id,
            owner_id: message.owner_id,
            event_id: message.event_id,
            quantity: message.quantity,
            total_price: message.total_price,
            published_at,
        })
    }
}
