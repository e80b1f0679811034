use crate::service::{
    confirmations_service::ConfirmationsService, dead_letter_service::DeadLetterService,
    delivery_attempts_service::DeliveryAttemptsService,
};
use async_trait::async_trait;
use rabbitmq_client::consumer::{
    callback::RabbitmqConsumerDeliveryCallback, error::ConsumeError, Delivery,
};
use std::sync::Arc;
use tickets::message::PurchaseEvent;

///
/// Acks confirmed deliveries, requeues failed ones
/// and dead-letters those that can't be processed.
///
pub struct PurchaseDeliveryCallback {
    max_delivery_attempts: u32,
    confirmations_service: Arc<dyn ConfirmationsService>,
    delivery_attempts_service: Arc<dyn DeliveryAttemptsService>,
    dead_letter_service: Arc<dyn DeadLetterService>,
}

impl PurchaseDeliveryCallback {
    pub fn new(
        max_delivery_attempts: u32,
        confirmations_service: Arc<dyn ConfirmationsService>,
        delivery_attempts_service: Arc<dyn DeliveryAttemptsService>,
        dead_letter_service: Arc<dyn DeadLetterService>,
    ) -> Self {
        Self {
            max_delivery_attempts,
            confirmations_service,
            delivery_attempts_service,
            dead_letter_service,
        }
    }

    async fn dead_letter(&self, content: Vec<u8>) -> Result<(), ConsumeError> {
        match self.dead_letter_service.dead_letter(content).await {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(%err, "failed to dead-letter delivery");
                Err(ConsumeError::requeue())
            }
        }
    }
}

#[async_trait]
impl RabbitmqConsumerDeliveryCallback for PurchaseDeliveryCallback {
    #[tracing::instrument(
        name = "Purchase Delivery",
        skip_all,
        fields(
            delivery_tag = delivery.delivery_tag,
            redelivered = delivery.redelivered,
        )
    )]
    async fn execute(&self, delivery: Delivery) -> Result<(), ConsumeError> {
        let event = match PurchaseEvent::decode(&delivery.content) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(%err, "invalid purchase event");
                return self.dead_letter(delivery.content).await;
            }
        };

        let ticket_id = event.ticket_id;
        tracing::info!(%ticket_id, "processing purchase event");

        match self.confirmations_service.confirm(event).await {
            Ok(outcome) => {
                tracing::info!(outcome = outcome.as_str(), "purchase event processed");
                self.delivery_attempts_service.clear(ticket_id).await;
                Ok(())
            }
            Err(err) => {
                let failed = self.delivery_attempts_service.record_failure(ticket_id).await;
                if failed < self.max_delivery_attempts {
                    tracing::warn!(%err, failed, "processing failed, requeueing");
                    return Err(ConsumeError::requeue());
                }

                tracing::error!(%err, failed, "processing failed too many times");
                let result = self.dead_letter(delivery.content).await;
                if result.is_ok() {
                    self.delivery_attempts_service.clear(ticket_id).await;
                }

                result
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        error::Error,
        service::{
            confirmations_service::{ConfirmationOutcome, MockConfirmationsService},
            dead_letter_service::MockDeadLetterService,
            delivery_attempts_service::MockDeliveryAttemptsService,
        },
    };
    use bson::oid::ObjectId;
    use mockall::predicate::eq;
    use rabbitmq_client::producer::PublishError;
    use std::time::Duration;
    use time::OffsetDateTime;

    const MAX_DELIVERY_ATTEMPTS: u32 = 3;

    fn event(ticket_id: ObjectId) -> PurchaseEvent {
        PurchaseEvent {
            ticket_id,
            owner_id: "u1".to_string(),
            event_id: "evt-1".to_string(),
            quantity: 1,
            total_price: 10.0,
            published_at: OffsetDateTime::now_utc(),
        }
    }

    fn delivery(content: Vec<u8>) -> Delivery {
        Delivery {
            delivery_tag: 1,
            redelivered: false,
            content,
        }
    }

    fn callback(
        confirmations_service: MockConfirmationsService,
        delivery_attempts_service: MockDeliveryAttemptsService,
        dead_letter_service: MockDeadLetterService,
    ) -> PurchaseDeliveryCallback {
        PurchaseDeliveryCallback::new(
            MAX_DELIVERY_ATTEMPTS,
            Arc::new(confirmations_service),
            Arc::new(delivery_attempts_service),
            Arc::new(dead_letter_service),
        )
    }

    fn failing_confirmations() -> MockConfirmationsService {
        let mut confirmations_service = MockConfirmationsService::new();
        confirmations_service
            .expect_confirm()
            .returning(|_| Err(Error::TicketNotExist));
        confirmations_service
    }

    #[tokio::test]
    async fn execute_confirmed_acks_and_clears_attempts() {
        let ticket_id = ObjectId::new();
        let mut confirmations_service = MockConfirmationsService::new();
        confirmations_service
            .expect_confirm()
            .withf(move |event| event.ticket_id == ticket_id)
            .times(1)
            .returning(|_| Ok(ConfirmationOutcome::AlreadyConfirmed));
        let mut delivery_attempts_service = MockDeliveryAttemptsService::new();
        delivery_attempts_service
            .expect_clear()
            .with(eq(ticket_id))
            .times(1)
            .return_const(());
        let mut dead_letter_service = MockDeadLetterService::new();
        dead_letter_service.expect_dead_letter().never();
        let callback = callback(
            confirmations_service,
            delivery_attempts_service,
            dead_letter_service,
        );

        let result = callback.execute(delivery(event(ticket_id).encode())).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn execute_invalid_payload_is_dead_lettered() {
        let content = b"not a purchase event".to_vec();
        let mut confirmations_service = MockConfirmationsService::new();
        confirmations_service.expect_confirm().never();
        let mut dead_letter_service = MockDeadLetterService::new();
        dead_letter_service
            .expect_dead_letter()
            .with(eq(content.clone()))
            .times(1)
            .returning(|_| Ok(()));
        let callback = callback(
            confirmations_service,
            MockDeliveryAttemptsService::new(),
            dead_letter_service,
        );

        let result = callback.execute(delivery(content)).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn execute_failure_below_limit_requeues() {
        let mut delivery_attempts_service = MockDeliveryAttemptsService::new();
        delivery_attempts_service
            .expect_record_failure()
            .times(1)
            .return_const(MAX_DELIVERY_ATTEMPTS - 1);
        delivery_attempts_service.expect_clear().never();
        let mut dead_letter_service = MockDeadLetterService::new();
        dead_letter_service.expect_dead_letter().never();
        let callback = callback(
            failing_confirmations(),
            delivery_attempts_service,
            dead_letter_service,
        );

        let result = callback
            .execute(delivery(event(ObjectId::new()).encode()))
            .await;

        assert!(matches!(result, Err(ConsumeError { requeue: true })));
    }

    #[tokio::test]
    async fn execute_failure_at_limit_is_dead_lettered() {
        let ticket_id = ObjectId::new();
        let content = event(ticket_id).encode();
        let mut delivery_attempts_service = MockDeliveryAttemptsService::new();
        delivery_attempts_service
            .expect_record_failure()
            .with(eq(ticket_id))
            .times(1)
            .return_const(MAX_DELIVERY_ATTEMPTS);
        delivery_attempts_service
            .expect_clear()
            .with(eq(ticket_id))
            .times(1)
            .return_const(());
        let mut dead_letter_service = MockDeadLetterService::new();
        dead_letter_service
            .expect_dead_letter()
            .with(eq(content.clone()))
            .times(1)
            .returning(|_| Ok(()));
        let callback = callback(
            failing_confirmations(),
            delivery_attempts_service,
            dead_letter_service,
        );

        let result = callback.execute(delivery(content)).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn execute_dead_letter_failure_requeues() {
        let mut delivery_attempts_service = MockDeliveryAttemptsService::new();
        delivery_attempts_service
            .expect_record_failure()
            .return_const(MAX_DELIVERY_ATTEMPTS);
        delivery_attempts_service.expect_clear().never();
        let mut dead_letter_service = MockDeadLetterService::new();
        dead_letter_service
            .expect_dead_letter()
            .returning(|_| Err(PublishError::ConfirmTimeout(Duration::from_secs(1))));
        let callback = callback(
            failing_confirmations(),
            delivery_attempts_service,
            dead_letter_service,
        );

        let result = callback
            .execute(delivery(event(ObjectId::new()).encode()))
            .await;

        assert!(matches!(result, Err(ConsumeError { requeue: true })));
    }
}
