use super::dto::Message;
use amqprs::AmqpDeliveryTag;
use std::collections::VecDeque;

///
/// Messages published on the current channel and still waiting for publisher confirm.
///
/// Delivery tags are assigned by the channel in publish order,
/// so the queue is always sorted by tag.
///
pub struct UnconfirmedMessages {
    messages: VecDeque<(AmqpDeliveryTag, Box<Message>)>,
}

impl UnconfirmedMessages {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
        }
    }

    pub fn push(&mut self, delivery_tag: AmqpDeliveryTag, message: Box<Message>) {
        self.messages.push_back((delivery_tag, message));
    }

    ///
    /// Removes messages covered by a publisher confirm.
    ///
    /// ### Returns
    /// Removed messages in publish order.
    /// Empty when `delivery_tag` was already confirmed.
    ///
    pub fn remove(&mut self, delivery_tag: AmqpDeliveryTag, multiple: bool) -> Vec<Box<Message>> {
        if multiple {
            let count = self
                .messages
                .iter()
                .take_while(|(tag, _)| *tag <= delivery_tag)
                .count();

            return self
                .messages
                .drain(..count)
                .map(|(_, message)| message)
                .collect();
        }

        self.messages
            .iter()
            .position(|(tag, _)| *tag == delivery_tag)
            .and_then(|idx| self.messages.remove(idx))
            .map(|(_, message)| message)
            .into_iter()
            .collect()
    }

    ///
    /// Removes every message, e.g. when channel failed
    /// and no more confirms will arrive for it.
    ///
    pub fn drain(&mut self) -> impl Iterator<Item = Box<Message>> + '_ {
        self.messages.drain(..).map(|(_, message)| message)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use amqprs::BasicProperties;

    fn message(routing_key: &str) -> Box<Message> {
        Box::new(Message {
            routing_key: routing_key.to_string(),
            basic_properties: BasicProperties::default(),
            content: Vec::new(),
            confirm_tx: None,
        })
    }

    fn routing_keys(messages: &[Box<Message>]) -> Vec<&str> {
        messages
            .iter()
            .map(|message| message.routing_key.as_str())
            .collect()
    }

    #[test]
    fn remove_multiple_removes_every_tag_up_to_confirmed_one() {
        let mut unconfirmed = UnconfirmedMessages::new();
        unconfirmed.push(1, message("first"));
        unconfirmed.push(2, message("second"));
        unconfirmed.push(3, message("third"));

        let removed = unconfirmed.remove(2, true);

        assert_eq!(routing_keys(&removed), vec!["first", "second"]);
        assert_eq!(unconfirmed.len(), 1);
    }

    #[test]
    fn remove_single_removes_only_confirmed_tag() {
        let mut unconfirmed = UnconfirmedMessages::new();
        unconfirmed.push(1, message("first"));
        unconfirmed.push(2, message("second"));
        unconfirmed.push(3, message("third"));

        let removed = unconfirmed.remove(2, false);

        assert_eq!(routing_keys(&removed), vec!["second"]);
        let remaining = unconfirmed.drain().collect::<Vec<_>>();
        assert_eq!(routing_keys(&remaining), vec!["first", "third"]);
    }

    #[test]
    fn remove_already_confirmed_tag() {
        let mut unconfirmed = UnconfirmedMessages::new();
        unconfirmed.push(4, message("fourth"));

        assert!(unconfirmed.remove(2, false).is_empty());
        assert!(unconfirmed.remove(3, true).is_empty());
        assert_eq!(unconfirmed.len(), 1);
    }

    #[tokio::test]
    async fn confirm_notifies_sender() {
        let (confirm_tx, confirm_rx) = tokio::sync::oneshot::channel();
        let mut message = message("confirmed");
        message.confirm_tx = Some(confirm_tx);

        message.confirm();

        assert!(confirm_rx.await.is_ok());
    }
}
