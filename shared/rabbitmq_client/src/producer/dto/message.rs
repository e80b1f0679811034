use amqprs::BasicProperties;
use tokio::sync::oneshot;

pub struct Message {
    pub routing_key: String,
    pub basic_properties: BasicProperties,
    pub content: Vec<u8>,

    /// Notified once broker acks the message
    pub confirm_tx: Option<oneshot::Sender<()>>,
}

impl Message {
    pub fn confirm(mut self: Box<Self>) {
        if let Some(confirm_tx) = self.confirm_tx.take() {
            // receiver is allowed to lose interest in the confirmation
            let _ = confirm_tx.send(());
        }
    }
}
