use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TicketsServiceConfig {
    /// Deadline of every database call made on behalf of a request
    pub request_timeout: Duration,
}
