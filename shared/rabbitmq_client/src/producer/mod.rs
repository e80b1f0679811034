//!
//! Module with producer that publishes messages with publisher confirms enabled.
//!

mod channel_events;
mod dto;
mod error;
mod rabbitmq_producer;
mod state_machine;
mod unconfirmed_messages;

pub use dto::PublishConfirmation;
pub use error::PublishError;
pub use rabbitmq_producer::RabbitmqProducer;
