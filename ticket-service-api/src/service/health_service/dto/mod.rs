mod database_status;
mod health_service_config;

pub use database_status::DatabaseStatus;
pub use health_service_config::HealthServiceConfig;
