pub mod connection;
pub mod consumer;
pub mod producer;
mod retry;
mod topology;

pub use connection::{RabbitmqConnection, RabbitmqConnectionConfig, RabbitmqConnectionStatus};
pub use consumer::RabbitmqConsumer;
pub use producer::RabbitmqProducer;
pub use topology::declare_queue;
