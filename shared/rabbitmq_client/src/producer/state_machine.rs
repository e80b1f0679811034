use super::{
    channel_events::{ChannelEvent, ChannelEvents},
    dto::{Message, PublisherConfirm, PublisherConfirmVariant},
    unconfirmed_messages::UnconfirmedMessages,
};
use crate::{retry::retry, RabbitmqConnection};
use amqprs::{
    channel::{BasicPublishArguments, Channel, ConfirmSelectArguments, ExchangeDeclareArguments},
    connection::Connection,
    AmqpDeliveryTag,
};
use tokio::sync::{mpsc, watch};

pub struct StateMachine {
    rabbitmq_connection: RabbitmqConnection,

    connection: Option<Connection>,
    connection_rx: watch::Receiver<Option<Connection>>,

    channel: Channel,
    channel_events_rx: mpsc::UnboundedReceiver<ChannelEvent>,

    exchange_declare_args: ExchangeDeclareArguments,

    unconfirmed_messages: UnconfirmedMessages,
    messages_tx: mpsc::UnboundedSender<Box<Message>>,
    messages_rx: mpsc::UnboundedReceiver<Box<Message>>,

    flow_tx: watch::Sender<bool>,
    flow_rx: watch::Receiver<bool>,

    blocked_rx: watch::Receiver<bool>,

    state: State,
}

impl StateMachine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rabbitmq_connection: RabbitmqConnection,
        connection: Connection,
        channel: Channel,
        channel_events_rx: mpsc::UnboundedReceiver<ChannelEvent>,
        exchange_declare_args: ExchangeDeclareArguments,
        messages_tx: mpsc::UnboundedSender<Box<Message>>,
        messages_rx: mpsc::UnboundedReceiver<Box<Message>>,
        flow_tx: watch::Sender<bool>,
        flow_rx: watch::Receiver<bool>,
    ) -> Self {
        let connection_rx = rabbitmq_connection.connection();
        let blocked_rx = rabbitmq_connection.connection_blocked();

        Self {
            rabbitmq_connection,
            connection: Some(connection),
            connection_rx,
            channel,
            channel_events_rx,
            exchange_declare_args,
            unconfirmed_messages: UnconfirmedMessages::new(),
            messages_tx,
            messages_rx,
            flow_tx,
            flow_rx,
            blocked_rx,
            state: State::Publishing,
        }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    ///
    /// Infinite loop that keeps producer alive.
    /// It's designed to work with external signal to stop it.
    /// ```text
    /// tokio::select! {
    ///     _ = notify.notified() => {}
    ///     _ = state_machine.run() => {}
    /// }
    /// ```
    ///
    pub async fn run(&mut self) {
        loop {
            tracing::info!(state = ?self.state, "producer state");

            self.state = match self.state {
                State::Publishing => self.publishing_state().await,
                State::ChannelBroken => self.channel_broken_state().await,
                State::WaitingForConnection => self.waiting_for_connection_state().await,
                State::RestoringChannel => self.restoring_channel_state().await,
                State::ConnectionClosed => self.connection_closed_state().await,
            };
        }
    }

    async fn publishing_state(&mut self) -> State {
        let mut flow = *self.flow_rx.borrow_and_update();
        let mut blocked = *self.blocked_rx.borrow_and_update();

        // Publish sequence numbers start from 1 on every new channel
        let mut delivery_tag: AmqpDeliveryTag = 0;

        loop {
            tokio::select! {
                biased;

                _ = self.connection_rx.changed() => {
                    tracing::info!("connection changed");
                    return State::ChannelBroken;
                }

                _ = self.flow_rx.changed() => {
                    flow = *self.flow_rx.borrow_and_update();
                    tracing::debug!(flow, "flow changed");
                }

                _ = self.blocked_rx.changed() => {
                    blocked = *self.blocked_rx.borrow_and_update();
                    tracing::debug!(blocked, "blocked changed");
                }

                Some(event) = self.channel_events_rx.recv() => match event {
                    ChannelEvent::Confirm(confirm) => self.process_confirm(confirm),
                    ChannelEvent::Closed => return State::ChannelBroken,
                },

                Some(message) = self.messages_rx.recv(), if !blocked && flow => {
                    delivery_tag += 1;

                    let args = BasicPublishArguments::new(
                        &self.exchange_declare_args.exchange,
                        &message.routing_key,
                    );
                    let publish_result = self
                        .channel
                        .basic_publish(message.basic_properties.clone(), message.content.clone(), args)
                        .await;

                    match publish_result {
                        Ok(()) => {
                            tracing::debug!(delivery_tag, routing_key = message.routing_key, "message published");
                            self.unconfirmed_messages.push(delivery_tag, message);
                        }
                        Err(err) => {
                            tracing::warn!(delivery_tag, %err, "basic publish failed");
                            self.resend(message);
                            return State::ChannelBroken;
                        }
                    }
                }
            }
        }
    }

    async fn channel_broken_state(&mut self) -> State {
        // It fails in most cases, because channel usually breaks with connection
        match self.channel.clone().close().await {
            Ok(()) => tracing::info!("channel closed"),
            Err(err) => tracing::debug!(%err, "failed to close channel"),
        }

        // No confirms will arrive for the old channel after this point
        while let Ok(event) = self.channel_events_rx.try_recv() {
            if let ChannelEvent::Confirm(confirm) = event {
                self.process_confirm(confirm);
            }
        }

        let unconfirmed = self.unconfirmed_messages.drain().collect::<Vec<_>>();
        tracing::info!(
            count = unconfirmed.len(),
            "scheduling unconfirmed messages to be resent"
        );
        for message in unconfirmed {
            self.resend(message);
        }

        State::WaitingForConnection
    }

    async fn waiting_for_connection_state(&mut self) -> State {
        loop {
            self.connection = self.connection_rx.borrow_and_update().clone();
            if self.connection.is_some() {
                return State::RestoringChannel;
            }

            if self.connection_rx.changed().await.is_err() {
                return State::ConnectionClosed;
            }
        }
    }

    async fn restoring_channel_state(&mut self) -> State {
        let Some(connection) = self.connection.clone() else {
            return State::WaitingForConnection;
        };

        let retry_interval = self.rabbitmq_connection.config().retry_interval;
        let exchange_declare_args = &self.exchange_declare_args;
        let flow_tx = &self.flow_tx;

        let restore = async {
            let channel = retry(retry_interval, "open producer channel", || async {
                connection.open_channel(None).await
            })
            .await;

            // New channel can't inherit flow of the old one
            flow_tx.send_replace(true);

            let channel_events_rx =
                retry(retry_interval, "register producer channel callback", || async {
                    let (channel_events, channel_events_rx) = ChannelEvents::new(flow_tx.clone());
                    channel
                        .register_callback(channel_events)
                        .await
                        .map(|()| channel_events_rx)
                })
                .await;

            retry(retry_interval, "declare exchange", || async {
                channel.exchange_declare(exchange_declare_args.clone()).await
            })
            .await;

            retry(retry_interval, "enable publisher confirms", || async {
                channel
                    .confirm_select(ConfirmSelectArguments::new(false))
                    .await
            })
            .await;

            (channel, channel_events_rx)
        };

        tokio::select! {
            biased;

            _ = self.connection_rx.changed() => {
                tracing::info!("connection changed while restoring channel");
                State::WaitingForConnection
            }

            (channel, channel_events_rx) = restore => {
                self.channel = channel;
                self.channel_events_rx = channel_events_rx;
                State::Publishing
            }
        }
    }

    async fn connection_closed_state(&mut self) -> State {
        tracing::error!("connection closed before producer, messages won't be published");
        std::future::pending::<()>().await;

        State::ConnectionClosed
    }

    fn process_confirm(&mut self, confirm: PublisherConfirm) {
        let messages = self
            .unconfirmed_messages
            .remove(confirm.delivery_tag, confirm.multiple);

        tracing::debug!(
            delivery_tag = confirm.delivery_tag,
            multiple = confirm.multiple,
            count = messages.len(),
            "processing publisher confirm"
        );

        match confirm.variant {
            PublisherConfirmVariant::Ack => messages.into_iter().for_each(Message::confirm),
            PublisherConfirmVariant::Nack => {
                for message in messages {
                    self.resend(message);
                }
            }
        }
    }

    fn resend(&self, message: Box<Message>) {
        // receiver is owned by the state machine, so it can't be closed here
        if self.messages_tx.send(message).is_err() {
            tracing::error!("message lost, producer queue closed");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Publishing,
    ChannelBroken,
    WaitingForConnection,
    RestoringChannel,
    ConnectionClosed,
}
