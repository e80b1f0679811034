//!
//! Module that allows to establish connection with RabbitMQ server.
//!

mod connection_events;
mod dto;
mod rabbitmq_connection;
mod state_machine;

pub use dto::{RabbitmqConnectionConfig, RabbitmqConnectionStatus};
pub use rabbitmq_connection::{RabbitmqConnection, RabbitmqConnectionMonitor};
