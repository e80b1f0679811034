use super::{DeadLetterService, DeadLetterServiceConfig};
use amqprs::{
    channel::{ExchangeDeclareArguments, ExchangeType, QueueBindArguments, QueueDeclareArguments},
    BasicProperties,
};
use async_trait::async_trait;
use rabbitmq_client::{declare_queue, producer::PublishError, RabbitmqConnection, RabbitmqProducer};
use std::time::Duration;

pub struct DeadLetterServiceImpl {
    dead_letter_queue: String,
    confirm_timeout: Duration,
    producer: RabbitmqProducer,
}

impl DeadLetterServiceImpl {
    pub async fn new(
        config: DeadLetterServiceConfig,
        rabbitmq_connection: RabbitmqConnection,
    ) -> anyhow::Result<Self> {
        let dead_letter_queue = config.dead_letter_queue();

        let exchange_declare_args =
            ExchangeDeclareArguments::of_type(&config.exchange, ExchangeType::Topic)
                .durable(true)
                .finish();
        declare_queue(
            &rabbitmq_connection,
            exchange_declare_args.clone(),
            QueueDeclareArguments::durable_client_named(&dead_letter_queue),
            vec![QueueBindArguments::new(
                &dead_letter_queue,
                &config.exchange,
                &dead_letter_queue,
            )],
        )
        .await?;

        let producer = RabbitmqProducer::new(rabbitmq_connection, exchange_declare_args).await?;

        Ok(Self {
            dead_letter_queue,
            confirm_timeout: config.confirm_timeout,
            producer,
        })
    }

    pub async fn close(self) {
        self.producer.close().await;
    }
}

#[async_trait]
impl DeadLetterService for DeadLetterServiceImpl {
    #[tracing::instrument(
        name = "Dead Letter",
        skip_all,
        fields(queue = %self.dead_letter_queue)
    )]
    async fn dead_letter(&self, content: Vec<u8>) -> Result<(), PublishError> {
        let basic_properties = BasicProperties::default().with_persistence(true).finish();

        tracing::warn!(len = content.len(), "dead-lettering message");
        let confirmation =
            self.producer
                .send(self.dead_letter_queue.clone(), basic_properties, content)?;

        confirmation.wait(self.confirm_timeout).await?;
        tracing::info!("message dead-lettered");

        Ok(())
    }
}
