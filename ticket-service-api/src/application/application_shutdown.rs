use super::ApplicationStateToClose;
use std::sync::Arc;

pub async fn close(state: ApplicationStateToClose) {
    tracing::info!("stopping unpublished tickets relay");
    state.unpublished_tickets_relay_close_notify.notify_one();
    if let Err(err) = state.unpublished_tickets_relay_handle.await {
        tracing::error!(%err, "unpublished tickets relay failed");
    }

    tracing::info!("closing purchase events producer");
    match Arc::try_unwrap(state.purchase_events_producer_service) {
        Ok(purchase_events_producer_service) => {
            purchase_events_producer_service.close().await;
        }
        Err(_) => tracing::error!("cannot close purchase events producer"),
    }

    tracing::info!("closing rabbitmq connection");
    state.rabbitmq_connection.close().await;

    tracing::info!("closing connection with database");
    state.db_client.shutdown().await;
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("starting shutdown");
}
