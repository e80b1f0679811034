use std::time::Duration;

pub struct UnpublishedTicketsRelayConfig {
    pub interval: Duration,
    /// Tickets younger than this are still being published by request handlers
    pub grace_period: Duration,
    pub batch_size: i64,
}
