use async_trait::async_trait;
use bson::oid::ObjectId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryAttemptsService: Send + Sync {
    ///
    /// Records failed delivery of ticket purchase event.
    ///
    /// ### Returns
    /// Number of failed deliveries of this ticket, including this one
    ///
    async fn record_failure(&self, ticket_id: ObjectId) -> u32;

    async fn clear(&self, ticket_id: ObjectId);
}
