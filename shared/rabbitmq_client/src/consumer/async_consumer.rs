use super::{callback::RabbitmqConsumerDeliveryCallback, error::ConsumeError, Delivery};
use amqprs::{
    channel::{BasicAckArguments, BasicNackArguments, Channel},
    BasicProperties, Deliver,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

///
/// Consumer spawning a task for every delivery.
///
/// Number of concurrently processed deliveries is limited by `in_flight`.
/// Receiving next delivery waits until one of the permits is released.
/// Once `in_flight` is closed every delivery is nacked with requeue without being processed.
///
pub struct AsyncConsumer<DeliveryCallback> {
    delivery_callback: Arc<DeliveryCallback>,
    in_flight: Arc<Semaphore>,
}

impl<DeliveryCallback> AsyncConsumer<DeliveryCallback> {
    pub fn new(delivery_callback: Arc<DeliveryCallback>, in_flight: Arc<Semaphore>) -> Self {
        Self {
            delivery_callback,
            in_flight,
        }
    }
}

#[async_trait]
impl<DeliveryCallback> amqprs::consumer::AsyncConsumer for AsyncConsumer<DeliveryCallback>
where
    DeliveryCallback: RabbitmqConsumerDeliveryCallback + Send + Sync + 'static,
{
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all
    )]
    async fn consume(
        &mut self,
        channel: &Channel,
        deliver: Deliver,
        _basic_properties: BasicProperties,
        content: Vec<u8>,
    ) {
        let delivery = Delivery {
            delivery_tag: deliver.delivery_tag(),
            redelivered: deliver.redelivered(),
            content,
        };

        tracing::info!(
            delivery_tag = delivery.delivery_tag,
            redelivered = delivery.redelivered,
            "received delivery"
        );

        let permit = match Arc::clone(&self.in_flight).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                // closed after deliveries in flight were drained
                tracing::warn!(delivery_tag = delivery.delivery_tag, "consumer closing, returning delivery");
                let args = BasicNackArguments::new(delivery.delivery_tag, false, true);
                if let Err(err) = channel.basic_nack(args).await {
                    tracing::debug!(%err, "delivery returns to queue with channel");
                }
                return;
            }
        };

        let processing_task = ProcessingTask {
            channel: channel.clone(),
            delivery_callback: Arc::clone(&self.delivery_callback),
            _permit: permit,
        };
        tokio::spawn(processing_task.run(delivery));
    }
}

struct ProcessingTask<DeliveryCallback> {
    channel: Channel,
    delivery_callback: Arc<DeliveryCallback>,

    // released when task finishes
    _permit: OwnedSemaphorePermit,
}

impl<DeliveryCallback> ProcessingTask<DeliveryCallback>
where
    DeliveryCallback: RabbitmqConsumerDeliveryCallback,
{
    #[tracing::instrument(
        name = "RabbitMQ Consumer Processor",
        target = "rabbitmq_client::consumer",
        skip_all,
        fields(delivery_tag = delivery.delivery_tag)
    )]
    async fn run(self, delivery: Delivery) {
        tracing::info!("processing delivery");

        let delivery_tag = delivery.delivery_tag;
        match self.delivery_callback.execute(delivery).await {
            Ok(()) => {
                let args = BasicAckArguments::new(delivery_tag, false);
                match self.channel.basic_ack(args).await {
                    Ok(()) => tracing::trace!("ack sent"),
                    Err(err) => tracing::warn!(%err, "failed to send ack"),
                }
            }
            Err(ConsumeError { requeue }) => {
                let args = BasicNackArguments::new(delivery_tag, false, requeue);
                match self.channel.basic_nack(args).await {
                    Ok(()) => tracing::trace!(requeue, "nack sent"),
                    Err(err) => tracing::warn!(requeue, %err, "failed to send nack"),
                }
            }
        }
    }
}
