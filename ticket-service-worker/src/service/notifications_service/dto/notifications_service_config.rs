pub struct NotificationsServiceConfig {
    pub exchange: String,
    /// Queue bound to exchange with its own name as routing key
    pub queue: String,
}
