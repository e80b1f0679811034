mod dto;
mod unpublished_tickets_relay;

pub use dto::UnpublishedTicketsRelayConfig;
pub use unpublished_tickets_relay::*;
