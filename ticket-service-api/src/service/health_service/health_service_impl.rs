use super::{DatabaseStatus, HealthService, HealthServiceConfig};
use axum::async_trait;
use rabbitmq_client::{connection::RabbitmqConnectionMonitor, RabbitmqConnectionStatus};
use std::{sync::Arc, time::Duration};
use tickets::repository::TicketsRepository;

pub struct HealthServiceImpl {
    config: HealthServiceConfig,
    repository: Arc<dyn TicketsRepository>,
    rabbitmq_connection_monitor: RabbitmqConnectionMonitor,
}

impl HealthServiceImpl {
    pub fn new(
        config: HealthServiceConfig,
        repository: Arc<dyn TicketsRepository>,
        rabbitmq_connection_monitor: RabbitmqConnectionMonitor,
    ) -> Self {
        Self {
            config,
            repository,
            rabbitmq_connection_monitor,
        }
    }
}

#[async_trait]
impl HealthService for HealthServiceImpl {
    async fn database_status(&self) -> DatabaseStatus {
        ping_database(self.repository.as_ref(), self.config.health_check_timeout).await
    }

    fn broker_status(&self) -> RabbitmqConnectionStatus {
        self.rabbitmq_connection_monitor.status()
    }
}

async fn ping_database(repository: &dyn TicketsRepository, timeout: Duration) -> DatabaseStatus {
    match tokio::time::timeout(timeout, repository.ping()).await {
        Ok(Ok(())) => DatabaseStatus::Connected,
        Ok(Err(err)) => {
            tracing::warn!(%err, "database ping failed");
            DatabaseStatus::Unreachable
        }
        Err(_) => {
            tracing::warn!(?timeout, "database ping timed out");
            DatabaseStatus::Unreachable
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tickets::repository::{self, MockTicketsRepository};

    #[tokio::test]
    async fn ping_ok() {
        let mut repository = MockTicketsRepository::new();
        repository.expect_ping().returning(|| Ok(()));

        let status = ping_database(&repository, Duration::from_secs(1)).await;

        assert_eq!(status, DatabaseStatus::Connected);
    }

    #[tokio::test]
    async fn ping_error() {
        let mut repository = MockTicketsRepository::new();
        repository.expect_ping().returning(|| {
            Err(repository::Error::Mongo(
                mongodb::error::ErrorKind::Custom(Arc::new("server selection timeout")).into(),
            ))
        });

        let status = ping_database(&repository, Duration::from_secs(1)).await;

        assert_eq!(status, DatabaseStatus::Unreachable);
    }

    #[test]
    fn status_names() {
        assert_eq!(DatabaseStatus::Connected.as_ref(), "connected");
        assert_eq!(DatabaseStatus::Unreachable.as_ref(), "unreachable");
    }
}
