use super::dto::{PublisherConfirm, PublisherConfirmVariant};
use amqprs::{
    channel::Channel, Ack, AmqpDeliveryTag, BasicProperties, Cancel, CloseChannel, Nack, Return,
};
use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

pub enum ChannelEvent {
    Confirm(PublisherConfirm),

    /// Every message not confirmed yet has to be published again on a new channel.
    Closed,
}

///
/// Channel callback registered once per producer channel.
///
/// Confirms and close are reported in the order server sent them,
/// flow is published through `flow_tx` shared with the state machine.
///
pub struct ChannelEvents {
    events_tx: mpsc::UnboundedSender<ChannelEvent>,
    flow_tx: watch::Sender<bool>,
}

impl ChannelEvents {
    pub fn new(flow_tx: watch::Sender<bool>) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (Self { events_tx, flow_tx }, events_rx)
    }

    fn report(&self, event: ChannelEvent) {
        if self.events_tx.send(event).is_err() {
            tracing::debug!("channel already abandoned by producer");
        }
    }

    fn confirm(&self, delivery_tag: AmqpDeliveryTag, multiple: bool, variant: PublisherConfirmVariant) {
        self.report(ChannelEvent::Confirm(PublisherConfirm {
            delivery_tag,
            multiple,
            variant,
        }));
    }
}

#[async_trait]
impl amqprs::callbacks::ChannelCallback for ChannelEvents {
    #[tracing::instrument(
        name = "RabbitMQ Producer Channel",
        target = "rabbitmq_client::producer",
        skip_all
    )]
    async fn close(
        &mut self,
        _channel: &Channel,
        close: CloseChannel,
    ) -> Result<(), amqprs::error::Error> {
        tracing::warn!(code = close.reply_code(), text = close.reply_text(), "channel closed by server");
        self.report(ChannelEvent::Closed);
        Ok(())
    }

    async fn cancel(
        &mut self,
        _channel: &Channel,
        _cancel: Cancel,
    ) -> Result<(), amqprs::error::Error> {
        Ok(())
    }

    async fn flow(
        &mut self,
        _channel: &Channel,
        active: bool,
    ) -> Result<bool, amqprs::error::Error> {
        tracing::debug!(active, "server changed channel flow");
        self.flow_tx.send_replace(active);
        Ok(active)
    }

    async fn publish_ack(&mut self, _channel: &Channel, ack: Ack) {
        self.confirm(ack.delivery_tag(), ack.mutiple(), PublisherConfirmVariant::Ack);
    }

    async fn publish_nack(&mut self, _channel: &Channel, nack: Nack) {
        self.confirm(nack.delivery_tag(), nack.multiple(), PublisherConfirmVariant::Nack);
    }

    // messages are never published as mandatory
    async fn publish_return(
        &mut self,
        _channel: &Channel,
        _ret: Return,
        _basic_properties: BasicProperties,
        _content: Vec<u8>,
    ) {
    }
}
