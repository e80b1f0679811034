use super::{
    DeliveryAttempts, DeliveryAttemptsService, DeliveryAttemptsServiceConfig,
    DeliveryAttemptsServiceGarbageCollector,
};
use async_trait::async_trait;
use bson::oid::ObjectId;
use std::{collections::HashMap, sync::Arc};
use time::OffsetDateTime;
use tokio::sync::Mutex;

///
/// Counts failed deliveries per ticket in memory of this process
///
pub struct DeliveryAttemptsServiceImpl {
    attempts: Arc<Mutex<HashMap<ObjectId, DeliveryAttempts>>>,
}

impl DeliveryAttemptsServiceImpl {
    pub fn new(
        config: DeliveryAttemptsServiceConfig,
    ) -> (Self, DeliveryAttemptsServiceGarbageCollector) {
        let attempts = Arc::new(Mutex::new(HashMap::new()));
        let garbage_collector =
            DeliveryAttemptsServiceGarbageCollector::new(config, Arc::clone(&attempts));

        (Self { attempts }, garbage_collector)
    }
}

#[async_trait]
impl DeliveryAttemptsService for DeliveryAttemptsServiceImpl {
    #[tracing::instrument(
        name = "Delivery Attempts",
        skip_all,
        fields(ticket_id = %ticket_id)
    )]
    async fn record_failure(&self, ticket_id: ObjectId) -> u32 {
        let now = OffsetDateTime::now_utc();

        let mut attempts = self.attempts.lock().await;
        let entry = attempts.entry(ticket_id).or_insert(DeliveryAttempts {
            failed: 0,
            last_attempt_at: now,
        });
        entry.failed = entry.failed.saturating_add(1);
        entry.last_attempt_at = now;

        tracing::trace!(failed = entry.failed, "failed delivery recorded");

        entry.failed
    }

    async fn clear(&self, ticket_id: ObjectId) {
        self.attempts.lock().await.remove(&ticket_id);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    fn service() -> DeliveryAttemptsServiceImpl {
        let config = DeliveryAttemptsServiceConfig {
            attempts_lifespan: Duration::from_secs(60),
            garbage_collector_interval: Duration::from_secs(60),
        };
        let (service, _) = DeliveryAttemptsServiceImpl::new(config);

        service
    }

    #[tokio::test]
    async fn record_failure_counts_per_ticket() {
        let service = service();
        let first = ObjectId::new();
        let second = ObjectId::new();

        assert_eq!(service.record_failure(first).await, 1);
        assert_eq!(service.record_failure(first).await, 2);
        assert_eq!(service.record_failure(second).await, 1);
        assert_eq!(service.record_failure(first).await, 3);
    }

    #[tokio::test]
    async fn clear_resets_counter() {
        let service = service();
        let ticket_id = ObjectId::new();
        service.record_failure(ticket_id).await;
        service.record_failure(ticket_id).await;

        service.clear(ticket_id).await;

        assert_eq!(service.record_failure(ticket_id).await, 1);
    }

    #[tokio::test]
    async fn clear_unknown_ticket() {
        let service = service();

        service.clear(ObjectId::new()).await;

        assert!(service.attempts.lock().await.is_empty());
    }
}
