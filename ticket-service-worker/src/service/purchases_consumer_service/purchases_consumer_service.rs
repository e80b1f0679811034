use super::{purchase_delivery_callback::PurchaseDeliveryCallback, PurchasesConsumerServiceConfig};
use crate::service::{
    confirmations_service::ConfirmationsService, dead_letter_service::DeadLetterService,
    delivery_attempts_service::DeliveryAttemptsService,
};
use amqprs::channel::{
    BasicConsumeArguments, ExchangeDeclareArguments, ExchangeType, QueueBindArguments,
    QueueDeclareArguments,
};
use async_trait::async_trait;
use rabbitmq_client::{
    consumer::{
        callback::RabbitmqConsumerStatusChangeCallback, RabbitmqConsumerConfig,
        RabbitmqConsumerStatus,
    },
    RabbitmqConnection, RabbitmqConsumer,
};
use std::sync::Arc;

pub struct PurchasesConsumerService {
    rabbitmq_consumer: RabbitmqConsumer,
}

impl PurchasesConsumerService {
    pub async fn new(
        config: PurchasesConsumerServiceConfig,
        rabbitmq_connection: RabbitmqConnection,
        confirmations_service: Arc<dyn ConfirmationsService>,
        delivery_attempts_service: Arc<dyn DeliveryAttemptsService>,
        dead_letter_service: Arc<dyn DeadLetterService>,
    ) -> anyhow::Result<Self> {
        let exchange_declare_args =
            ExchangeDeclareArguments::of_type(&config.exchange, ExchangeType::Topic)
                .durable(true)
                .finish();
        let queue_declare_args = QueueDeclareArguments::durable_client_named(&config.queue);
        let queue_bind_args = vec![QueueBindArguments::new(
            &config.queue,
            &config.exchange,
            &config.queue,
        )];
        let basic_consume_args = BasicConsumeArguments::new(&config.queue, "")
            .manual_ack(true)
            .finish();
        let consumer_config = RabbitmqConsumerConfig {
            max_in_flight: config.max_in_flight,
        };
        let delivery_callback = PurchaseDeliveryCallback::new(
            config.max_delivery_attempts,
            confirmations_service,
            delivery_attempts_service,
            dead_letter_service,
        );

        let rabbitmq_consumer = RabbitmqConsumer::new(
            rabbitmq_connection,
            consumer_config,
            exchange_declare_args,
            queue_declare_args,
            queue_bind_args,
            basic_consume_args,
            delivery_callback,
            StatusCallback,
        )
        .await?;

        Ok(Self { rabbitmq_consumer })
    }

    ///
    /// Stops consuming and waits until deliveries in flight are acked or nacked
    ///
    pub async fn close(self) {
        self.rabbitmq_consumer.close().await;
    }
}

struct StatusCallback;

#[async_trait]
impl RabbitmqConsumerStatusChangeCallback for StatusCallback {
    async fn execute(&self, status: RabbitmqConsumerStatus) {
        match status {
            RabbitmqConsumerStatus::Consuming => tracing::info!("consuming purchase events"),
            RabbitmqConsumerStatus::Recovering => {
                tracing::warn!("purchase events consumer recovering")
            }
        }
    }
}
