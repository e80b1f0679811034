mod rabbitmq_connection_config;
mod rabbitmq_connection_status;

pub use rabbitmq_connection_config::RabbitmqConnectionConfig;
pub use rabbitmq_connection_status::RabbitmqConnectionStatus;
