use super::{
    async_consumer::AsyncConsumer,
    callback::{RabbitmqConsumerDeliveryCallback, RabbitmqConsumerStatusChangeCallback},
    channel_events::{ChannelEvent, ChannelEvents},
    RabbitmqConsumerConfig, RabbitmqConsumerStatus,
};
use crate::{retry::retry, RabbitmqConnection};
use amqprs::{
    channel::{
        BasicCancelArguments, BasicConsumeArguments, BasicQosArguments, Channel,
        ExchangeDeclareArguments, QueueBindArguments, QueueDeclareArguments,
    },
    connection::Connection,
};
use anyhow::anyhow;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, AcquireError, Notify, Semaphore};

pub struct StateMachine<DeliveryCallback, StatusCallback> {
    rabbitmq_connection: RabbitmqConnection,
    config: RabbitmqConsumerConfig,

    connection: Option<Connection>,
    connection_rx: watch::Receiver<Option<Connection>>,

    channel: Channel,
    exchange_declare_args: ExchangeDeclareArguments,
    queue_declare_args: QueueDeclareArguments,
    queue_bind_args: Vec<QueueBindArguments>,
    basic_consume_args: BasicConsumeArguments,
    consumer_tag: String,

    channel_events_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    in_flight: Arc<Semaphore>,
    delivery_callback: Arc<DeliveryCallback>,
    status_callback: StatusCallback,

    state: State,
}

impl<DeliveryCallback, StatusCallback> StateMachine<DeliveryCallback, StatusCallback>
where
    DeliveryCallback: RabbitmqConsumerDeliveryCallback + Send + Sync + 'static,
    StatusCallback: RabbitmqConsumerStatusChangeCallback + Send + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rabbitmq_connection: RabbitmqConnection,
        config: RabbitmqConsumerConfig,
        connection: Connection,
        connection_rx: watch::Receiver<Option<Connection>>,
        channel: Channel,
        exchange_declare_args: ExchangeDeclareArguments,
        queue_declare_args: QueueDeclareArguments,
        queue_bind_args: Vec<QueueBindArguments>,
        basic_consume_args: BasicConsumeArguments,
        consumer_tag: String,
        channel_events_rx: mpsc::UnboundedReceiver<ChannelEvent>,
        in_flight: Arc<Semaphore>,
        delivery_callback: Arc<DeliveryCallback>,
        status_callback: StatusCallback,
    ) -> Self {
        Self {
            rabbitmq_connection,
            config,
            connection: Some(connection),
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
            state: State::Consuming,
        }
    }

    ///
    /// Loop that keeps consumer alive until `stop` is notified.
    ///
    /// After stop consumer is cancelled and deliveries already being processed are awaited.
    /// Deliveries that were on the way when consumer got cancelled are returned to the queue.
    /// Channel is closed last.
    ///
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all
    )]
    pub async fn run(mut self, stop: Arc<Notify>) {
        tracing::info!("state machine started");

        tokio::select! {
            biased;

            _ = stop.notified() => {}
            _ = self.keep_alive() => {}
        }

        tracing::info!("cancelling consumer");
        let args = BasicCancelArguments::new(&self.consumer_tag);
        match self.channel.basic_cancel(args).await {
            Ok(_) => tracing::info!("consumer cancelled"),
            Err(err) => tracing::warn!(%err, "cancelling consumer failed"),
        }

        tracing::info!("waiting for deliveries in flight");
        match drain_in_flight(&self.in_flight, self.config.max_in_flight).await {
            Ok(()) => tracing::info!("deliveries in flight finished"),
            Err(err) => tracing::warn!(%err, "waiting for deliveries failed"),
        }

        tracing::info!("closing channel");
        match self.channel.close().await {
            Ok(()) => tracing::info!("channel closed"),
            Err(err) => tracing::warn!(%err, "closing channel failed"),
        }

        tracing::info!("state machine finished");
    }

    async fn keep_alive(&mut self) {
        loop {
            tracing::info!(state = ?self.state, "consumer state");

            self.state = match self.state {
                State::Consuming => self.consuming_state().await,
                State::WaitingForConnection => self.waiting_for_connection_state().await,
                State::RecreatingChannel => self.recreating_channel_state().await,
                State::RestoringConsumer => self.restoring_consumer_state().await,
                State::ConnectionClosed => self.connection_closed_state().await,
            };
        }
    }

    async fn consuming_state(&mut self) -> State {
        self.status_callback
            .execute(RabbitmqConsumerStatus::Consuming)
            .await;

        let next_state = tokio::select! {
            biased;

            _ = self.connection_rx.changed() => {
                tracing::info!("connection changed");
                State::WaitingForConnection
            }
            event = self.channel_events_rx.recv() => {
                tracing::info!(?event, "consuming interrupted");
                if ChannelEvent::requires_new_channel(event) {
                    State::RecreatingChannel
                } else {
                    State::RestoringConsumer
                }
            }
        };

        self.status_callback
            .execute(RabbitmqConsumerStatus::Recovering)
            .await;

        next_state
    }

    async fn waiting_for_connection_state(&mut self) -> State {
        loop {
            self.connection = self.connection_rx.borrow_and_update().clone();
            if self.connection.is_some() {
                return State::RecreatingChannel;
            }

            if self.connection_rx.changed().await.is_err() {
                return State::ConnectionClosed;
            }
        }
    }

    async fn recreating_channel_state(&mut self) -> State {
        // Fails in most cases, because channel usually breaks with connection
        match self.channel.clone().close().await {
            Ok(()) => tracing::info!("channel closed"),
            Err(err) => tracing::debug!(%err, "failed to close channel"),
        }

        let Some(connection) = self.connection.clone() else {
            return State::WaitingForConnection;
        };

        let retry_interval = self.rabbitmq_connection.config().retry_interval;

        let recreate = async {
            let channel = retry(retry_interval, "open consumer channel", || async {
                connection.open_channel(None).await
            })
            .await;

            let channel_events_rx =
                retry(retry_interval, "register consumer channel callback", || async {
                    let (channel_events, channel_events_rx) = ChannelEvents::new();
                    channel
                        .register_callback(channel_events)
                        .await
                        .map(|()| channel_events_rx)
                })
                .await;

            (channel, channel_events_rx)
        };

        tokio::select! {
            biased;

            _ = self.connection_rx.changed() => {
                tracing::info!("connection changed while recreating channel");
                State::WaitingForConnection
            }

            (channel, channel_events_rx) = recreate => {
                self.channel = channel;
                self.channel_events_rx = channel_events_rx;
                State::RestoringConsumer
            }
        }
    }

    async fn restoring_consumer_state(&mut self) -> State {
        let consumer = AsyncConsumer::new(
            Arc::clone(&self.delivery_callback),
            Arc::clone(&self.in_flight),
        );

        let restore = try_restore_consumer(
            &self.channel,
            self.config.max_in_flight,
            self.exchange_declare_args.clone(),
            self.queue_declare_args.clone(),
            self.queue_bind_args.clone(),
            self.basic_consume_args.clone(),
            consumer,
        );

        tokio::select! {
            biased;

            _ = self.connection_rx.changed() => {
                tracing::info!("connection changed while restoring consumer");
                State::WaitingForConnection
            }

            result = restore => match result {
                Ok(consumer_tag) => {
                    self.consumer_tag = consumer_tag;
                    State::Consuming
                }
                Err(err) => {
                    tracing::warn!(%err, "failed to restore consumer");
                    tokio::time::sleep(self.rabbitmq_connection.config().retry_interval).await;
                    State::RecreatingChannel
                }
            }
        }
    }

    async fn connection_closed_state(&mut self) -> State {
        tracing::error!("connection closed before consumer, no more deliveries will arrive");
        std::future::pending::<()>().await;

        State::ConnectionClosed
    }
}

///
/// Waits until every delivery in flight is processed and closes `in_flight`.
///
/// Permits are never given back, so deliveries that arrive later
/// fail to acquire a permit and aren't processed.
///
async fn drain_in_flight(in_flight: &Semaphore, max_in_flight: u16) -> Result<(), AcquireError> {
    let permits = in_flight.acquire_many(u32::from(max_in_flight)).await?;
    permits.forget();
    in_flight.close();

    Ok(())
}

///
/// Declares topology and starts consuming on `channel`.
///
/// ### Returns
/// Consumer tag assigned by the server
///
pub async fn try_restore_consumer<DeliveryCallback>(
    channel: &Channel,
    prefetch_count: u16,
    exchange_declare_args: ExchangeDeclareArguments,
    queue_declare_args: QueueDeclareArguments,
    queue_bind_args: Vec<QueueBindArguments>,
    basic_consume_args: BasicConsumeArguments,
    consumer: AsyncConsumer<DeliveryCallback>,
) -> anyhow::Result<String>
where
    DeliveryCallback: RabbitmqConsumerDeliveryCallback + Send + Sync + 'static,
{
    tracing::info!(prefetch_count, "setting prefetch count");
    channel
        .basic_qos(BasicQosArguments::new(0, prefetch_count, false))
        .await
        .map_err(|err| anyhow!("failed to set prefetch count: {err}"))?;

    tracing::info!("declaring exchange");
    channel
        .exchange_declare(exchange_declare_args)
        .await
        .map_err(|err| anyhow!("failed to declare exchange: {err}"))?;

    tracing::info!("declaring queue");
    channel
        .queue_declare(queue_declare_args)
        .await
        .map_err(|err| anyhow!("failed to declare queue: {err}"))?;

    tracing::info!("binding queue");
    for queue_bind_args in queue_bind_args {
        channel
            .queue_bind(queue_bind_args)
            .await
            .map_err(|err| anyhow!("failed to bind queue: {err}"))?;
    }

    tracing::info!("consuming");
    let consumer_tag = channel
        .basic_consume(consumer, basic_consume_args)
        .await
        .map_err(|err| anyhow!("failed to consume: {err}"))?;

    Ok(consumer_tag)
}

#[derive(Debug, Clone, Copy)]
enum State {
    Consuming,
    WaitingForConnection,
    RecreatingChannel,
    RestoringConsumer,
    ConnectionClosed,
}
