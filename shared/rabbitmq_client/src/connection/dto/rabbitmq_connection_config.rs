use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RabbitmqConnectionConfig {
    /// Delay between attempts to recreate connection, channels and consumers
    pub retry_interval: Duration,
}
