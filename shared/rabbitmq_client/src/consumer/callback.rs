//!
//! Callbacks implemented by users of [super::RabbitmqConsumer].
//!

use super::{error::ConsumeError, Delivery, RabbitmqConsumerStatus};
use async_trait::async_trait;

///
/// Decides what happens with a single delivery.
///
/// Every delivery runs in its own task.
/// `Ok` acks the delivery, [ConsumeError] nacks it with the requeue flag it carries.
///
#[async_trait]
pub trait RabbitmqConsumerDeliveryCallback {
    async fn execute(&self, delivery: Delivery) -> Result<(), ConsumeError>;
}

/// Informs whether the consumer is receiving deliveries right now.
#[async_trait]
pub trait RabbitmqConsumerStatusChangeCallback {
    async fn execute(&self, status: RabbitmqConsumerStatus);
}
