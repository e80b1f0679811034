use super::DatabaseStatus;
use axum::async_trait;
use rabbitmq_client::RabbitmqConnectionStatus;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthService: Send + Sync {
    async fn database_status(&self) -> DatabaseStatus;

    fn broker_status(&self) -> RabbitmqConnectionStatus;
}
