#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RabbitmqConnectionStatus {
    /// Connection is open and server accepts publishes
    Connected,

    /// Connection is open, but server stopped accepting publishes
    Blocked,

    /// Connection is being recreated
    Disconnected,
}

impl RabbitmqConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RabbitmqConnectionStatus::Connected => "connected",
            RabbitmqConnectionStatus::Blocked => "blocked",
            RabbitmqConnectionStatus::Disconnected => "disconnected",
        }
    }
}
