use super::ApplicationState;
use std::sync::Arc;

pub async fn close(state: ApplicationState) {
    tracing::info!("closing purchases consumer");
    state.purchases_consumer_service.close().await;

    tracing::info!("closing notifications producer");
    match Arc::try_unwrap(state.notifications_service) {
        Ok(notifications_service) => notifications_service.close().await,
        Err(_) => tracing::error!("cannot close notifications producer"),
    }

    tracing::info!("closing dead letter producer");
    match Arc::try_unwrap(state.dead_letter_service) {
        Ok(dead_letter_service) => dead_letter_service.close().await,
        Err(_) => tracing::error!("cannot close dead letter producer"),
    }

    tracing::info!("stopping delivery attempts garbage collector");
    state
        .delivery_attempts_garbage_collector_close_notify
        .notify_one();
    if let Err(err) = state.delivery_attempts_garbage_collector_handle.await {
        tracing::error!(%err, "delivery attempts garbage collector failed");
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
