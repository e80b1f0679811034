use super::{
    async_consumer::AsyncConsumer,
    callback::{RabbitmqConsumerDeliveryCallback, RabbitmqConsumerStatusChangeCallback},
    channel_events::ChannelEvents,
    state_machine::{try_restore_consumer, StateMachine},
    RabbitmqConsumerConfig,
};
use crate::RabbitmqConnection;
use amqprs::channel::{
    BasicConsumeArguments, ExchangeDeclareArguments, QueueBindArguments, QueueDeclareArguments,
};
use std::sync::Arc;
use tokio::{
    sync::{Notify, Semaphore},
    task::JoinHandle,
};

///
/// Consumer with manual acks that keeps consuming after connection failures.
///
pub struct RabbitmqConsumer {
    task_handle: JoinHandle<()>,

    close_notify: Arc<Notify>,
}

impl RabbitmqConsumer {
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all
    )]
    #[allow(clippy::too_many_arguments)]
    pub async fn new<DeliveryCallback, StatusCallback>(
        rabbitmq_connection: RabbitmqConnection,
        config: RabbitmqConsumerConfig,
        mut exchange_declare_args: ExchangeDeclareArguments,
        mut queue_declare_args: QueueDeclareArguments,
        mut queue_bind_args: Vec<QueueBindArguments>,
        mut basic_consume_args: BasicConsumeArguments,
        delivery_callback: DeliveryCallback,
        status_callback: StatusCallback,
    ) -> anyhow::Result<Self>
    where
        DeliveryCallback: RabbitmqConsumerDeliveryCallback + Send + Sync + 'static,
        StatusCallback: RabbitmqConsumerStatusChangeCallback + Send + 'static,
    {
        tracing::info!("starting consumer");

        if config.max_in_flight == 0 {
            anyhow::bail!("max_in_flight has to be greater than 0");
        }

        let mut connection_rx = rabbitmq_connection.connection();
        let Some(connection) = connection_rx.borrow_and_update().clone() else {
            anyhow::bail!("connection failed before creating consumer");
        };

        tracing::info!("opening channel");
        let channel = connection.open_channel(None).await?;

        tracing::info!("registering channel callback");
        let (channel_events, channel_events_rx) = ChannelEvents::new();
        channel.register_callback(channel_events).await?;

        exchange_declare_args.no_wait = false;
        queue_declare_args.no_wait(false);
        for queue_bind_args in queue_bind_args.iter_mut() {
            queue_bind_args.no_wait = false;
        }
        basic_consume_args.no_ack = false;
        basic_consume_args.no_wait = false;

        let in_flight = Arc::new(Semaphore::new(usize::from(config.max_in_flight)));
        let delivery_callback = Arc::new(delivery_callback);
        let consumer = AsyncConsumer::new(Arc::clone(&delivery_callback), Arc::clone(&in_flight));

        let consumer_tag = try_restore_consumer(
            &channel,
            config.max_in_flight,
            exchange_declare_args.clone(),
            queue_declare_args.clone(),
            queue_bind_args.clone(),
            basic_consume_args.clone(),
            consumer,
        )
        .await?;

        let state_machine = StateMachine::new(
            rabbitmq_connection,
            config,
            connection,
            connection_rx,
            channel,
            exchange_declare_args,
            queue_declare_args,
            queue_bind_args,
            basic_consume_args,
            consumer_tag,
            channel_events_rx,
            in_flight,
            delivery_callback,
            status_callback,
        );

        let close_notify = Arc::new(Notify::new());
        let task_handle = tokio::spawn(state_machine.run(Arc::clone(&close_notify)));

        tracing::info!("consumer started");

        Ok(Self {
            task_handle,
            close_notify,
        })
    }

    ///
    /// Stops consuming and waits until deliveries in flight are processed.
    ///
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all
    )]
    pub async fn close(self) {
        tracing::info!("closing consumer");

        self.close_notify.notify_one();

        if let Err(err) = self.task_handle.await {
            tracing::error!(%err, "consumer task failed");
        }

        tracing::info!("consumer closed");
    }
}
