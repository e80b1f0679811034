///
/// Error returned by [super::callback::RabbitmqConsumerDeliveryCallback].
///
/// Delivery is nacked and, depending on `requeue`, returned to the queue.
///
#[derive(Debug)]
pub struct ConsumeError {
    pub requeue: bool,
}

impl ConsumeError {
    pub fn requeue() -> Self {
        Self { requeue: true }
    }
}
