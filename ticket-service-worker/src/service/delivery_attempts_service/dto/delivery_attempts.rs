use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryAttempts {
    pub failed: u32,
    pub last_attempt_at: OffsetDateTime,
}
