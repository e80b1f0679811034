use amqprs::{connection::Connection, Close};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{watch, Notify};

///
/// Connection callback translating server notifications into connection state.
///
/// Blocked flag is shared by every connection the state machine opens,
/// while close notification belongs to a single connection.
///
pub struct ConnectionEvents {
    blocked_tx: watch::Sender<bool>,
    closed_by_server: Arc<Notify>,
}

impl ConnectionEvents {
    ///
    /// ### Returns
    /// Callback for a new connection and notification fired when server closes that connection
    ///
    pub fn new(blocked_tx: watch::Sender<bool>) -> (Self, Arc<Notify>) {
        let closed_by_server = Arc::new(Notify::new());
        let connection_events = Self {
            blocked_tx,
            closed_by_server: Arc::clone(&closed_by_server),
        };

        (connection_events, closed_by_server)
    }

    fn set_blocked(&self, blocked: bool) {
        let was_blocked = self.blocked_tx.send_replace(blocked);
        if was_blocked != blocked {
            tracing::info!(blocked, "connection blocked flag changed");
        }
    }

    fn set_closed(&self) {
        // stored permit is consumed by the state machine even if it isn't waiting yet
        self.closed_by_server.notify_one();
    }
}

#[async_trait]
impl amqprs::callbacks::ConnectionCallback for ConnectionEvents {
    #[tracing::instrument(
        name = "RabbitMQ Connection Events",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    async fn close(
        &mut self,
        _connection: &Connection,
        close: Close,
    ) -> Result<(), amqprs::error::Error> {
        tracing::warn!(code = close.reply_code(), text = close.reply_text(), "connection closed by server");
        self.set_closed();
        Ok(())
    }

    #[tracing::instrument(
        name = "RabbitMQ Connection Events",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    async fn blocked(&mut self, _connection: &Connection, reason: String) {
        tracing::warn!(reason, "publishing blocked by server");
        self.set_blocked(true);
    }

    async fn unblocked(&mut self, _connection: &Connection) {
        self.set_blocked(false);
    }
}
