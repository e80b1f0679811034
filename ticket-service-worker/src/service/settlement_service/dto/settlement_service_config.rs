use std::time::Duration;

pub struct SettlementServiceConfig {
    /// Simulated latency of the payment provider
    pub delay: Duration,
    pub timeout: Duration,
}
