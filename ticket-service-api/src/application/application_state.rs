use super::ApplicationEnv;
use crate::service::{
    health_service::{HealthService, HealthServiceConfig, HealthServiceImpl},
    purchase_events_producer_service::{
        PurchaseEventsProducerServiceConfig, PurchaseEventsProducerServiceImpl,
    },
    tickets_service::{TicketsService, TicketsServiceConfig, TicketsServiceImpl},
    unpublished_tickets_relay::{UnpublishedTicketsRelay, UnpublishedTicketsRelayConfig},
};
use amqprs::connection::OpenConnectionArguments;
use axum::extract::FromRef;
use mongodb::{options::ClientOptions, Client};
use rabbitmq_client::{RabbitmqConnection, RabbitmqConnectionConfig};
use std::sync::Arc;
use tickets::repository::TicketsRepositoryImpl;
use tokio::{sync::Notify, task::JoinHandle};

#[derive(Clone, FromRef)]
pub struct ApplicationState {
    pub tickets_service: Arc<dyn TicketsService>,
    pub health_service: Arc<dyn HealthService>,
}

pub struct ApplicationStateToClose {
    pub db_client: Client,
    pub rabbitmq_connection: RabbitmqConnection,
    pub purchase_events_producer_service: Arc<PurchaseEventsProducerServiceImpl>,
    pub unpublished_tickets_relay_handle: JoinHandle<()>,
    pub unpublished_tickets_relay_close_notify: Arc<Notify>,
}

pub async fn create_state(
    env: &ApplicationEnv,
) -> anyhow::Result<(ApplicationState, ApplicationStateToClose)> {
    tracing::info!("connecting to database");
    let db_client_options = ClientOptions::parse(&env.db_connection_string).await?;
    let db_client = Client::with_options(db_client_options)?;
    let db = db_client.database(&env.db_name);

    tracing::info!("creating repositories");
    let tickets_repository = TicketsRepositoryImpl::new(db).await?;
    let tickets_repository = Arc::new(tickets_repository);

    tracing::info!("connecting to rabbitmq");
    let config = RabbitmqConnectionConfig {
        retry_interval: env.rabbitmq_retry_interval,
    };
    let open_connection_args =
        OpenConnectionArguments::try_from(env.rabbitmq_connection_string.as_str())?;
    let rabbitmq_connection = RabbitmqConnection::new(config, open_connection_args).await?;

    tracing::info!("creating services");
    let config = PurchaseEventsProducerServiceConfig {
        exchange: env.rabbitmq_exchange_name.clone(),
        queue: env.rabbitmq_purchased_queue_name.clone(),
        confirm_timeout: env.publish_confirm_timeout,
    };
    let purchase_events_producer_service =
        PurchaseEventsProducerServiceImpl::new(config, rabbitmq_connection.clone()).await?;
    let purchase_events_producer_service = Arc::new(purchase_events_producer_service);

    let config = TicketsServiceConfig {
        request_timeout: env.request_timeout,
    };
    let tickets_service = TicketsServiceImpl::new(
        config,
        tickets_repository.clone(),
        purchase_events_producer_service.clone(),
    );
    let tickets_service = Arc::new(tickets_service);

    let config = HealthServiceConfig {
        health_check_timeout: env.health_check_timeout,
    };
    let health_service = HealthServiceImpl::new(
        config,
        tickets_repository.clone(),
        rabbitmq_connection.monitor(),
    );
    let health_service = Arc::new(health_service);

    tracing::info!("starting unpublished tickets relay");
    let config = UnpublishedTicketsRelayConfig {
        interval: env.relay_interval,
        grace_period: env.relay_grace_period,
        batch_size: env.relay_batch_size,
    };
    let unpublished_tickets_relay = UnpublishedTicketsRelay::new(
        config,
        tickets_repository,
        purchase_events_producer_service.clone(),
    );
    let unpublished_tickets_relay_close_notify = Arc::new(Notify::new());
    let unpublished_tickets_relay_handle = tokio::spawn(
        unpublished_tickets_relay.run(Arc::clone(&unpublished_tickets_relay_close_notify)),
    );

    Ok((
        ApplicationState {
            tickets_service,
            health_service,
        },
        ApplicationStateToClose {
            db_client,
            rabbitmq_connection,
            purchase_events_producer_service,
            unpublished_tickets_relay_handle,
            unpublished_tickets_relay_close_notify,
        },
    ))
}
