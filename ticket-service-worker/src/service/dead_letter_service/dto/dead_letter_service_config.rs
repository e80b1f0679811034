use std::time::Duration;

pub struct DeadLetterServiceConfig {
    pub exchange: String,
    /// Name of the queue whose messages are dead-lettered.
    /// Dead letter queue is named `<queue>.dead-letter`
    pub queue: String,
    pub confirm_timeout: Duration,
}

impl DeadLetterServiceConfig {
    pub fn dead_letter_queue(&self) -> String {
        format!("{}.dead-letter", self.queue)
    }
}
