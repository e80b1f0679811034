use super::{NotificationsService, NotificationsServiceConfig};
use amqprs::{
    channel::{ExchangeDeclareArguments, ExchangeType, QueueBindArguments, QueueDeclareArguments},
    BasicProperties,
};
use rabbitmq_client::{declare_queue, RabbitmqConnection, RabbitmqProducer};
use tickets::{
    message::{TicketConfirmedProtobuf, PROTOBUF_CONTENT_TYPE},
    Ticket,
};

pub struct NotificationsServiceImpl {
    config: NotificationsServiceConfig,
    producer: RabbitmqProducer,
}

impl NotificationsServiceImpl {
    pub async fn new(
        config: NotificationsServiceConfig,
        rabbitmq_connection: RabbitmqConnection,
    ) -> anyhow::Result<Self> {
        let exchange_declare_args =
            ExchangeDeclareArguments::of_type(&config.exchange, ExchangeType::Topic)
                .durable(true)
                .finish();
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

impl NotificationsService for NotificationsServiceImpl {
    #[tracing::instrument(
        name = "Notifications",
        skip_all,
        fields(ticket_id = %ticket.id)
    )]
    fn notify_confirmed(&self, ticket: &Ticket) {
        let basic_properties = BasicProperties::default()
            .with_persistence(true)
            .with_content_type(PROTOBUF_CONTENT_TYPE)
            .finish();

        let content = TicketConfirmedProtobuf::encode_ticket(ticket);
        match self
            .producer
            .send(self.config.queue.clone(), basic_properties, content)
        {
            Ok(_) => tracing::debug!("ticket confirmed message scheduled"),
            Err(err) => tracing::warn!(%err, "failed to schedule ticket confirmed message"),
        }

        tracing::info!(
            to = %ticket.owner_id,
            event_id = %ticket.event_id,
            quantity = ticket.quantity,
            total_price = ticket.total_price,
            "mock email: your ticket purchase has been confirmed"
        );
    }
}
