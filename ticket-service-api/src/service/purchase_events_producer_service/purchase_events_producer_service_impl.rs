use super::{PurchaseEventsProducerService, PurchaseEventsProducerServiceConfig};
use amqprs::{
    channel::{ExchangeDeclareArguments, ExchangeType, QueueBindArguments, QueueDeclareArguments},
    BasicProperties,
};
use axum::async_trait;
use rabbitmq_client::{declare_queue, producer::PublishError, RabbitmqConnection, RabbitmqProducer};
use tickets::message::{PurchaseEvent, PROTOBUF_CONTENT_TYPE};

pub struct PurchaseEventsProducerServiceImpl {
    config: PurchaseEventsProducerServiceConfig,
    producer: RabbitmqProducer,
}

impl PurchaseEventsProducerServiceImpl {
    pub async fn new(
        config: PurchaseEventsProducerServiceConfig,
        rabbitmq_connection: RabbitmqConnection,
    ) -> anyhow::Result<Self> {
        let exchange_declare_args =
            ExchangeDeclareArguments::of_type(&config.exchange, ExchangeType::Topic)
                .durable(true)
                .finish();

        // events published before the worker starts must not be dropped
        declare_queue(
            &rabbitmq_connection,
            exchange_declare_args.clone(),
            QueueDeclareArguments::durable_client_named(&config.queue),
            vec![QueueBindArguments::new(
                &config.queue,
                &config.exchange,
                &config.queue,
            )],
        )
        .await?;

        let producer = RabbitmqProducer::new(rabbitmq_connection, exchange_declare_args).await?;

        Ok(Self { config, producer })
    }

    pub async fn close(self) {
        self.producer.close().await;
    }
}

#[async_trait]
impl PurchaseEventsProducerService for PurchaseEventsProducerServiceImpl {
    #[tracing::instrument(
        name = "Purchase Events Producer",
        skip_all,
        fields(ticket_id = %event.ticket_id)
    )]
    async fn produce(&self, event: PurchaseEvent) -> Result<(), PublishError> {
        let basic_properties = BasicProperties::default()
            .with_persistence(true)
            .with_content_type(PROTOBUF_CONTENT_TYPE)
            .finish();

        tracing::info!(published_at = %event.published_at, "producing purchase event");
        let confirmation =
            self.producer
                .send(self.config.queue.clone(), basic_properties, event.encode())?;

        confirmation.wait(self.config.confirm_timeout).await?;
        tracing::info!("purchase event confirmed");

        Ok(())
    }
}
