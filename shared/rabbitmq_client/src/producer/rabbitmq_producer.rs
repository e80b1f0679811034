use super::{
    channel_events::ChannelEvents,
    dto::{Message, PublishConfirmation},
    state_machine::StateMachine,
    PublishError,
};
use crate::RabbitmqConnection;
use amqprs::{
    channel::{Channel, ConfirmSelectArguments, ExchangeDeclareArguments},
    BasicProperties,
};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot, watch, Notify},
    task::JoinHandle,
};

///
/// Producer publishing to a single exchange.
///
/// Messages are buffered and published by a background task
/// that recreates the channel after failures and resends
/// every message that wasn't acked by the broker.
///
pub struct RabbitmqProducer {
    messages_tx: mpsc::UnboundedSender<Box<Message>>,

    task_handle: JoinHandle<Channel>,
    close_notify: Arc<Notify>,
}

impl RabbitmqProducer {
    #[tracing::instrument(
        name = "RabbitMQ Producer",
        target = "rabbitmq_client::producer",
        skip_all
    )]
    pub async fn new(
        rabbitmq_connection: RabbitmqConnection,
        mut exchange_declare_args: ExchangeDeclareArguments,
    ) -> anyhow::Result<Self> {
        tracing::info!("starting producer");

        let Some(connection) = rabbitmq_connection.connection().borrow().clone() else {
            anyhow::bail!("connection failed before creating producer");
        };

        tracing::info!("opening channel");
        let channel = connection.open_channel(None).await?;

        tracing::info!("registering channel callback");
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();
        let (flow_tx, flow_rx) = watch::channel(true);
        let (channel_events, channel_events_rx) = ChannelEvents::new(flow_tx.clone());
        channel.register_callback(channel_events).await?;

        tracing::info!("declaring exchange");
        exchange_declare_args.no_wait = false;
        channel
            .exchange_declare(exchange_declare_args.clone())
            .await?;

        tracing::info!("enabling publisher confirms");
        channel
            .confirm_select(ConfirmSelectArguments::new(false))
            .await?;

        let state_machine = StateMachine::new(
            rabbitmq_connection,
            connection,
            channel,
            channel_events_rx,
            exchange_declare_args,
            messages_tx.clone(),
            messages_rx,
            flow_tx,
            flow_rx,
        );

        let close_notify = Arc::new(Notify::new());
        let task_handle = tokio::spawn(keep_alive(Arc::clone(&close_notify), state_machine));

        tracing::info!("producer started");

        Ok(Self {
            messages_tx,
            task_handle,
            close_notify,
        })
    }

    #[tracing::instrument(
        name = "RabbitMQ Producer",
        target = "rabbitmq_client::producer",
        skip_all
    )]
    pub async fn close(self) {
        tracing::info!("closing producer");

        self.close_notify.notify_one();

        let channel = match self.task_handle.await {
            Ok(channel) => channel,
            Err(err) => {
                tracing::error!(%err, "producer task failed");
                return;
            }
        };

        tracing::info!("closing channel");
        if let Err(err) = channel.close().await {
            tracing::warn!(%err, "closing channel failed");
        }

        tracing::info!("producer closed");
    }

    ///
    /// Schedules message to be published.
    ///
    /// ### Returns
    /// [PublishConfirmation] that can be awaited for broker confirm.
    /// It can be dropped when caller isn't interested in confirmation.
    ///
    /// ### Errors
    /// - [PublishError::Closed] when producer task is not running anymore
    ///
    pub fn send(
        &self,
        routing_key: String,
        basic_properties: BasicProperties,
        content: Vec<u8>,
    ) -> Result<PublishConfirmation, PublishError> {
        let (confirm_tx, confirm_rx) = oneshot::channel();
        let message = Box::new(Message {
            routing_key,
            basic_properties,
            content,
            confirm_tx: Some(confirm_tx),
        });

        self.messages_tx
            .send(message)
            .map_err(|_| PublishError::Closed)?;

        Ok(PublishConfirmation::new(confirm_rx))
    }
}

///
/// Runs producer state machine until `close_notify` is notified.
///
/// ### Returns
/// Channel used by state machine. There's no guarantee it will be still opened
///
#[tracing::instrument(
    name = "RabbitMQ Producer",
    target = "rabbitmq_client::producer",
    skip_all
)]
async fn keep_alive(close_notify: Arc<Notify>, mut state_machine: StateMachine) -> Channel {
    tracing::info!("keep alive started");

    tokio::select! {
        biased;

        _ = close_notify.notified() => {}
        _ = state_machine.run() => {}
    }

    tracing::info!("keep alive finished");

    state_machine.channel().clone()
}
