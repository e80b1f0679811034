mod delivery_attempts;
mod delivery_attempts_service_config;

pub use delivery_attempts::DeliveryAttempts;
pub use delivery_attempts_service_config::DeliveryAttemptsServiceConfig;
