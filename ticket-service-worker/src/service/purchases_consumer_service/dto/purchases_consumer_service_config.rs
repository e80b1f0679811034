pub struct PurchasesConsumerServiceConfig {
    pub exchange: String,
    /// Queue bound to exchange with its own name as routing key
    pub queue: String,
    pub max_in_flight: u16,
    /// Failed deliveries of one ticket before its event is dead-lettered
    pub max_delivery_attempts: u32,
}
