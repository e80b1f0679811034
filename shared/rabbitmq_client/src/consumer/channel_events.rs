use amqprs::{channel::Channel, Ack, BasicProperties, Cancel, CloseChannel, Nack, Return};
use async_trait::async_trait;
use tokio::sync::mpsc;

///
/// Server initiated event that ends consuming on the current channel.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Channel is still usable, only `basic.consume` has to be repeated.
    ConsumerCancelled,

    /// Channel is gone, a new one has to be opened.
    ChannelClosed,
}

impl ChannelEvent {
    ///
    /// Maps event to the state consumer has to go through to receive deliveries again.
    ///
    /// `None` means the channel dropped its callback without telling why,
    /// which is handled the same way as a closed channel.
    ///
    pub fn requires_new_channel(event: Option<Self>) -> bool {
        !matches!(event, Some(ChannelEvent::ConsumerCancelled))
    }
}

///
/// Channel callback that reports [ChannelEvent]s to the consumer state machine.
///
/// One instance is registered per channel,
/// so events of an abandoned channel never reach the receiver of the current one.
///
pub struct ChannelEvents {
    events_tx: mpsc::UnboundedSender<ChannelEvent>,
}

impl ChannelEvents {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (Self { events_tx }, events_rx)
    }

    fn report(&self, event: ChannelEvent) {
        if self.events_tx.send(event).is_err() {
            tracing::debug!(?event, "channel already abandoned by consumer");
        }
    }
}

#[async_trait]
impl amqprs::callbacks::ChannelCallback for ChannelEvents {
    #[tracing::instrument(
        name = "RabbitMQ Consumer Channel",
        target = "rabbitmq_client::consumer",
        skip_all
    )]
    async fn close(
        &mut self,
        _channel: &Channel,
        close: CloseChannel,
    ) -> Result<(), amqprs::error::Error> {
        tracing::warn!(code = close.reply_code(), text = close.reply_text(), "channel closed by server");
        self.report(ChannelEvent::ChannelClosed);
        Ok(())
    }

    #[tracing::instrument(
        name = "RabbitMQ Consumer Channel",
        target = "rabbitmq_client::consumer",
        skip_all
    )]
    async fn cancel(
        &mut self,
        _channel: &Channel,
        _cancel: Cancel,
    ) -> Result<(), amqprs::error::Error> {
        tracing::warn!("consumer cancelled by server");
        self.report(ChannelEvent::ConsumerCancelled);
        Ok(())
    }

    async fn flow(
        &mut self,
        _channel: &Channel,
        active: bool,
    ) -> Result<bool, amqprs::error::Error> {
        Ok(active)
    }

    // Nothing is published on consumer channels.
    async fn publish_ack(&mut self, _channel: &Channel, _ack: Ack) {}
    async fn publish_nack(&mut self, _channel: &Channel, _nack: Nack) {}
    async fn publish_return(
        &mut self,
        _channel: &Channel,
        _ret: Return,
        _basic_properties: BasicProperties,
        _content: Vec<u8>,
    ) {
    }
}
