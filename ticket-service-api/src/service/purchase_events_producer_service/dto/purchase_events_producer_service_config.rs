use std::time::Duration;

pub struct PurchaseEventsProducerServiceConfig {
    pub exchange: String,
    /// Queue bound to exchange with its own name as routing key
    pub queue: String,
    pub confirm_timeout: Duration,
}
