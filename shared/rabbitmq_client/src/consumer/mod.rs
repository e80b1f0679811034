//!
//! Module with tools that allow to consume messages from RabbitMQ queues
//!

pub mod callback;
pub mod error;

mod async_consumer;
mod channel_events;
mod dto;
mod rabbitmq_consumer;
mod state_machine;

pub use dto::{Delivery, RabbitmqConsumerConfig, RabbitmqConsumerStatus};
pub use rabbitmq_consumer::RabbitmqConsumer;
