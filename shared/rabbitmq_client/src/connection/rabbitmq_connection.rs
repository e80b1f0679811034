use super::{
    connection_events::ConnectionEvents, state_machine::StateMachine,
    RabbitmqConnectionConfig, RabbitmqConnectionStatus,
};
use amqprs::connection::{Connection, OpenConnectionArguments};
use std::sync::Arc;
use tokio::{
    sync::{watch, Notify},
    task::JoinHandle,
};

///
/// RabbitMQ connection.
/// It runs background task that recreates connection whenever io_failure occurs.
///
/// Underlying connection can be accessed by [Self::connection].
/// Blocked signal can be accessed by [Self::connection_blocked].
/// Current state, e.g. for health checks, can be read through [Self::monitor].
///
#[derive(Clone)]
pub struct RabbitmqConnection {
    inner: Arc<RabbitmqConnectionInner>,
}

struct RabbitmqConnectionInner {
    config: RabbitmqConnectionConfig,

    connection_rx: watch::Receiver<Option<Connection>>,
    connection_blocked_rx: watch::Receiver<bool>,

    keep_alive_handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl RabbitmqConnection {
    #[tracing::instrument(
        name = "RabbitMQ Connection",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    pub async fn new(
        config: RabbitmqConnectionConfig,
        open_connection_args: OpenConnectionArguments,
    ) -> Result<Self, amqprs::error::Error> {
        tracing::info!("opening connection");
        let connection = Connection::open(&open_connection_args).await?;

        tracing::info!("registering callback");
        let (blocked_tx, blocked_rx) = watch::channel(false);
        let (connection_events, closed_by_server) = ConnectionEvents::new(blocked_tx.clone());
        connection.register_callback(connection_events).await?;

        tracing::info!("starting keep alive task");
        let close_notify = Arc::new(Notify::new());
        let (connection_tx, connection_rx) = watch::channel(Some(connection.clone()));
        let state_machine = StateMachine::new(
            config.clone(),
            connection,
            connection_tx,
            open_connection_args,
            closed_by_server,
            blocked_tx,
        );

        let keep_alive_handle = tokio::spawn(state_machine.run(Arc::clone(&close_notify)));

        tracing::info!("connection opened");

        Ok(Self {
            inner: Arc::new(RabbitmqConnectionInner {
                config,
                connection_rx,
                connection_blocked_rx: blocked_rx,
                keep_alive_handle,
                close_notify,
            }),
        })
    }

    ///
    /// Close underlying connection and task that recreates it.
    ///
    /// Every producer and consumer using this connection has to be closed first,
    /// otherwise nothing is closed and error is logged.
    ///
    #[tracing::instrument(
        name = "RabbitMQ Connection",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    pub async fn close(self) {
        let Ok(inner) = Arc::try_unwrap(self.inner) else {
            tracing::error!("closing connection when connection clones exist is forbidden");
            return;
        };

        inner.close_notify.notify_one();
        if let Err(err) = inner.keep_alive_handle.await {
            tracing::error!(%err, "keep alive task failed");
        }
    }

    pub fn config(&self) -> &RabbitmqConnectionConfig {
        &self.inner.config
    }

    pub fn connection(&self) -> watch::Receiver<Option<Connection>> {
        self.inner.connection_rx.clone()
    }

    pub fn connection_blocked(&self) -> watch::Receiver<bool> {
        self.inner.connection_blocked_rx.clone()
    }

    ///
    /// Creates read-only view of the connection state.
    ///
    /// Monitor doesn't keep the connection alive,
    /// so it doesn't prevent [Self::close] from succeeding.
    ///
    pub fn monitor(&self) -> RabbitmqConnectionMonitor {
        RabbitmqConnectionMonitor {
            connection_rx: self.connection(),
            connection_blocked_rx: self.connection_blocked(),
        }
    }
}

#[derive(Clone)]
pub struct RabbitmqConnectionMonitor {
    connection_rx: watch::Receiver<Option<Connection>>,
    connection_blocked_rx: watch::Receiver<bool>,
}

impl RabbitmqConnectionMonitor {
    pub fn status(&self) -> RabbitmqConnectionStatus {
        let connected = self
            .connection_rx
            .borrow()
            .as_ref()
            .is_some_and(Connection::is_open);
        let blocked = *self.connection_blocked_rx.borrow();

        match (connected, blocked) {
            (false, _) => RabbitmqConnectionStatus::Disconnected,
            (true, true) => RabbitmqConnectionStatus::Blocked,
            (true, false) => RabbitmqConnectionStatus::Connected,
        }
    }
}
