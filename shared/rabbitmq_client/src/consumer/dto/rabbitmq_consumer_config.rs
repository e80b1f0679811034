#[derive(Debug, Clone)]
pub struct RabbitmqConsumerConfig {
    /// Maximum number of deliveries processed concurrently.
    /// It's used as channel prefetch count as well.
    pub max_in_flight: u16,
}
