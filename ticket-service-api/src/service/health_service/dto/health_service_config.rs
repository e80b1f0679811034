use std::time::Duration;

pub struct HealthServiceConfig {
    pub health_check_timeout: Duration,
}
