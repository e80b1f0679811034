use amqprs::AmqpDeliveryTag;

#[derive(Debug)]
pub struct Delivery {
    pub delivery_tag: AmqpDeliveryTag,

    /// Set by the server when message was delivered before and not acked
    pub redelivered: bool,

    pub content: Vec<u8>,
}
