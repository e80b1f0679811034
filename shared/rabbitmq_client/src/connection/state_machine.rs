use super::{connection_events::ConnectionEvents, RabbitmqConnectionConfig};
use crate::retry::retry;
use amqprs::connection::{Connection, OpenConnectionArguments};
use std::sync::Arc;
use tokio::sync::{watch, Notify};

pub struct StateMachine {
    config: RabbitmqConnectionConfig,

    connection: Connection,
    connection_tx: watch::Sender<Option<Connection>>,

    open_connection_args: OpenConnectionArguments,
    closed_by_server: Arc<Notify>,

    blocked_tx: watch::Sender<bool>,

    state: State,
}

impl StateMachine {
    pub fn new(
        config: RabbitmqConnectionConfig,
        connection: Connection,
        connection_tx: watch::Sender<Option<Connection>>,
        open_connection_args: OpenConnectionArguments,
        closed_by_server: Arc<Notify>,
        blocked_tx: watch::Sender<bool>,
    ) -> Self {
        Self {
            config,
            connection,
            connection_tx,
            open_connection_args,
            closed_by_server,
            blocked_tx,
            state: State::Open,
        }
    }

    ///
    /// Loop that keeps connection alive until `stop` is notified.
    ///
    #[tracing::instrument(
        name = "RabbitMQ Connection",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    pub async fn run(mut self, stop: Arc<Notify>) {
        tracing::info!("state machine started");

        tokio::select! {
            biased;

            _ = stop.notified() => {}
            _ = self.keep_alive() => {}
        }

        // Nobody will use connection after this point
        self.connection_tx.send_replace(None);

        tracing::info!("closing connection");
        match self.connection.close().await {
            Ok(()) => tracing::info!("connection closed"),
            Err(err) => tracing::warn!(%err, "closing connection failed"),
        }

        tracing::info!("state machine finished");
    }

    async fn keep_alive(&mut self) {
        loop {
            tracing::info!(state = ?self.state, "connection state");

            self.state = match self.state {
                State::Open => self.open_state().await,
                State::Broken => self.broken_state().await,
                State::Reopening => self.reopening_state().await,
                State::RegisteringCallback => self.registering_callback_state().await,
            };
        }
    }

    async fn open_state(&mut self) -> State {
        tokio::select! {
            _ = self.connection.listen_network_io_failure() => {
                tracing::warn!("connection failure");
            }
            _ = self.closed_by_server.notified() => {
                tracing::warn!("connection closed by server");
            }
        }

        State::Broken
    }

    async fn broken_state(&mut self) -> State {
        self.connection_tx.send_replace(None);

        match self.connection.clone().close().await {
            Ok(()) => tracing::info!("broken connection closed"),
            Err(err) => tracing::debug!(%err, "failed to close broken connection"),
        }

        State::Reopening
    }

    async fn reopening_state(&mut self) -> State {
        let open_connection_args = &self.open_connection_args;
        self.connection = retry(self.config.retry_interval, "open connection", || async {
            Connection::open(open_connection_args).await
        })
        .await;

        // New connection can't inherit blocked flag of the old one
        self.blocked_tx.send_replace(false);

        // Connection is published only after its callback is registered
        State::RegisteringCallback
    }

    async fn registering_callback_state(&mut self) -> State {
        let connection = self.connection.clone();
        let blocked_tx = self.blocked_tx.clone();

        tokio::select! {
            _ = connection.listen_network_io_failure() => {
                tracing::warn!("connection failed while registering callback");
                State::Broken
            }

            closed_by_server = retry(self.config.retry_interval, "register connection callback", || async {
                let (connection_events, closed_by_server) = ConnectionEvents::new(blocked_tx.clone());
                connection
                    .register_callback(connection_events)
                    .await
                    .map(|()| closed_by_server)
            }) => {
                self.closed_by_server = closed_by_server;
                self.connection_tx.send_replace(Some(self.connection.clone()));
                State::Open
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Open,
    Broken,
    Reopening,
    RegisteringCallback,
}
