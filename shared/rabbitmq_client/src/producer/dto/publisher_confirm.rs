use amqprs::AmqpDeliveryTag;

pub struct PublisherConfirm {
    pub delivery_tag: AmqpDeliveryTag,
    pub multiple: bool,
    pub variant: PublisherConfirmVariant,
}

pub enum PublisherConfirmVariant {
    Ack,
    Nack,
}
