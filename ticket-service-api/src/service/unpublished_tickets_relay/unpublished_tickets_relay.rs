use super::UnpublishedTicketsRelayConfig;
use crate::service::purchase_events_producer_service::PurchaseEventsProducerService;
use std::sync::Arc;
use tickets::{message::PurchaseEvent, repository::TicketsRepository};
use time::OffsetDateTime;
use tokio::{
    sync::Notify,
    time::{interval, Interval, MissedTickBehavior},
};

///
/// Republishes purchase events of pending tickets
/// that were never confirmed by the broker.
///
pub struct UnpublishedTicketsRelay {
    repository: Arc<dyn TicketsRepository>,
    purchase_events_producer_service: Arc<dyn PurchaseEventsProducerService>,

    interval: Interval,
    grace_period: std::time::Duration,
    batch_size: i64,
}

impl UnpublishedTicketsRelay {
    pub fn new(
        config: UnpublishedTicketsRelayConfig,
        repository: Arc<dyn TicketsRepository>,
        purchase_events_producer_service: Arc<dyn PurchaseEventsProducerService>,
    ) -> Self {
        let mut interval = interval(config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            repository,
            purchase_events_producer_service,
            interval,
            grace_period: config.grace_period,
            batch_size: config.batch_size,
        }
    }

    #[tracing::instrument(name = "Unpublished Tickets Relay", skip_all)]
    pub async fn run(mut self, close_notify: Arc<Notify>) {
        tokio::select! {
            biased;

            _ = close_notify.notified() => {},

            _ = async { loop {
                self.interval.tick().await;
                self.relay_once().await;
            }} => {}
        }

        tracing::info!("relay stopped");
    }

    ///
    /// Publishes one batch of unpublished tickets.
    ///
    /// ### Returns
    /// Number of tickets published
    ///
    async fn relay_once(&self) -> usize {
        let created_before = OffsetDateTime::now_utc() - self.grace_period;
        let tickets = match self
            .repository
            .find_many_unpublished(created_before, self.batch_size)
            .await
        {
            Ok(tickets) => tickets,
            Err(err) => {
                tracing::warn!(%err, "failed to find unpublished tickets");
                return 0;
            }
        };

        if tickets.is_empty() {
            return 0;
        }
        tracing::info!(count = tickets.len(), "republishing purchase events");

        let mut published = 0;
        for ticket in tickets {
            let published_at = OffsetDateTime::now_utc();
            let event = PurchaseEvent::from_ticket(&ticket, published_at);

            if let Err(err) = self.purchase_events_producer_service.produce(event).await {
                // broker is most likely unavailable, next pass will retry
                tracing::warn!(%err, id = %ticket.id, "failed to republish purchase event");
                break;
            }

            match self
                .repository
                .update_published_at(ticket.id, published_at)
                .await
            {
                Ok(()) => published += 1,
                Err(err) => {
                    tracing::warn!(%err, id = %ticket.id, "failed to mark purchase event as published")
                }
            }
        }

        tracing::info!(published, "republishing finished");

        published
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::service::purchase_events_producer_service::MockPurchaseEventsProducerService;
    use bson::oid::ObjectId;
    use rabbitmq_client::producer::PublishError;
    use std::time::Duration;
    use tickets::{repository::MockTicketsRepository, Ticket, TicketStatus};

    fn config() -> UnpublishedTicketsRelayConfig {
        UnpublishedTicketsRelayConfig {
            interval: Duration::from_millis(10),
            grace_period: Duration::from_secs(30),
            batch_size: 100,
        }
    }

    fn unpublished_ticket() -> Ticket {
        let created_at = OffsetDateTime::now_utc() - Duration::from_secs(60);
        Ticket {
            id: ObjectId::new(),
            owner_id: "u1".to_string(),
            event_id: "evt-1".to_string(),
            quantity: 1,
            total_price: 10.0,
            status: TicketStatus::Pending,
            created_at,
            updated_at: created_at,
            published_at: None,
        }
    }

    #[tokio::test]
    async fn relay_publishes_and_marks_tickets() {
        let tickets = vec![unpublished_ticket(), unpublished_ticket()];
        let mut repository = MockTicketsRepository::new();
        repository
            .expect_find_many_unpublished()
            .withf(|created_before, limit| {
                *created_before < OffsetDateTime::now_utc() - Duration::from_secs(29)
                    && *limit == 100
            })
            .times(1)
            .returning(move |_, _| Ok(tickets.clone()));
        repository
            .expect_update_published_at()
            .times(2)
            .returning(|_, _| Ok(()));
        let mut producer = MockPurchaseEventsProducerService::new();
        producer.expect_produce().times(2).returning(|_| Ok(()));
        let relay = UnpublishedTicketsRelay::new(config(), Arc::new(repository), Arc::new(producer));

        let published = relay.relay_once().await;

        assert_eq!(published, 2);
    }

    #[tokio::test]
    async fn relay_stops_batch_on_publish_failure() {
        let tickets = vec![unpublished_ticket(), unpublished_ticket()];
        let mut repository = MockTicketsRepository::new();
        repository
            .expect_find_many_unpublished()
            .returning(move |_, _| Ok(tickets.clone()));
        repository.expect_update_published_at().never();
        let mut producer = MockPurchaseEventsProducerService::new();
        producer
            .expect_produce()
            .times(1)
            .returning(|_| Err(PublishError::Closed));
        let relay = UnpublishedTicketsRelay::new(config(), Arc::new(repository), Arc::new(producer));

        let published = relay.relay_once().await;

        assert_eq!(published, 0);
    }

    #[tokio::test]
    async fn relay_survives_database_error() {
        let mut repository = MockTicketsRepository::new();
        repository
            .expect_find_many_unpublished()
            .returning(|_, _| Err(tickets::repository::Error::NoDocumentUpdated));
        let mut producer = MockPurchaseEventsProducerService::new();
        producer.expect_produce().never();
        let relay = UnpublishedTicketsRelay::new(config(), Arc::new(repository), Arc::new(producer));

        let published = relay.relay_once().await;

        assert_eq!(published, 0);
    }

    #[tokio::test]
    async fn run_stops_on_close_notify() {
        let mut repository = MockTicketsRepository::new();
        repository
            .expect_find_many_unpublished()
            .returning(|_, _| Ok(vec![]));
        let relay = UnpublishedTicketsRelay::new(
            config(),
            Arc::new(repository),
            Arc::new(MockPurchaseEventsProducerService::new()),
        );
        let close_notify = Arc::new(Notify::new());

        let handle = tokio::spawn(relay.run(Arc::clone(&close_notify)));
        tokio::time::sleep(Duration::from_millis(50)).await;
        close_notify.notify_one();

        let result = tokio::time::timeout(Duration::from_secs(1), handle).await;

        assert!(matches!(result, Ok(Ok(()))));
    }
}
