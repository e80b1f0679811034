use std::time::Duration;

#[derive(Clone)]
pub struct DeliveryAttemptsServiceConfig {
    /// Entries not updated for that long are forgotten
    pub attempts_lifespan: Duration,
    pub garbage_collector_interval: Duration,
}
