use axum::async_trait;
use rabbitmq_client::producer::PublishError;
use tickets::message::PurchaseEvent;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PurchaseEventsProducerService: Send + Sync {
    ///
    /// Publishes persistent purchase event and waits until broker confirms it.
    ///
    /// ### Errors
    /// - [PublishError::ConfirmTimeout] when broker didn't confirm in time.
    /// Event may still be published later
    /// - [PublishError::Closed] when producer is closed
    ///
    async fn produce(&self, event: PurchaseEvent) -> Result<(), PublishError>;
}
