mod delivery;
mod rabbitmq_consumer_config;
mod rabbitmq_consumer_status;

pub use delivery::Delivery;
pub use rabbitmq_consumer_config::RabbitmqConsumerConfig;
pub use rabbitmq_consumer_status::RabbitmqConsumerStatus;
