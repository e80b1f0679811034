use super::ApplicationEnv;
use crate::service::{
    confirmations_service::ConfirmationsServiceImpl,
    dead_letter_service::{DeadLetterServiceConfig, DeadLetterServiceImpl},
    delivery_attempts_service::{DeliveryAttemptsServiceConfig, DeliveryAttemptsServiceImpl},
    notifications_service::{NotificationsServiceConfig, NotificationsServiceImpl},
    purchases_consumer_service::{PurchasesConsumerService, PurchasesConsumerServiceConfig},
    settlement_service::{SettlementServiceConfig, SettlementServiceImpl},
};
use amqprs::connection::OpenConnectionArguments;
use mongodb::{options::ClientOptions, Client};
use rabbitmq_client::{RabbitmqConnection, RabbitmqConnectionConfig};
use std::sync::Arc;
use tickets::repository::TicketsRepositoryImpl;
use tokio::{sync::Notify, task::JoinHandle};

pub struct ApplicationState {
    pub db_client: Client,
    pub rabbitmq_connection: RabbitmqConnection,
    pub purchases_consumer_service: PurchasesConsumerService,
    pub notifications_service: Arc<NotificationsServiceImpl>,
    pub dead_letter_service: Arc<DeadLetterServiceImpl>,
    pub delivery_attempts_garbage_collector_handle: JoinHandle<()>,
    pub delivery_attempts_garbage_collector_close_notify: Arc<Notify>,
}

pub async fn create_state(env: &ApplicationEnv) -> anyhow::Result<ApplicationState> {
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
    let config = SettlementServiceConfig {
        delay: env.settlement_delay,
        timeout: env.settlement_timeout,
    };
    let settlement_service = SettlementServiceImpl::new(config);
    let settlement_service = Arc::new(settlement_service);

    let config = NotificationsServiceConfig {
        exchange: env.rabbitmq_exchange_name.clone(),
        queue: env.rabbitmq_confirmed_queue_name.clone(),
    };
    let notifications_service =
        NotificationsServiceImpl::new(config, rabbitmq_connection.clone()).await?;
    let notifications_service = Arc::new(notifications_service);

    let config = DeadLetterServiceConfig {
        exchange: env.rabbitmq_exchange_name.clone(),
        queue: env.rabbitmq_purchased_queue_name.clone(),
        confirm_timeout: env.publish_confirm_timeout,
    };
    let dead_letter_service = DeadLetterServiceImpl::new(config, rabbitmq_connection.clone()).await?;
    let dead_letter_service = Arc::new(dead_letter_service);

    let config = DeliveryAttemptsServiceConfig {
        attempts_lifespan: env.attempts_lifespan,
        garbage_collector_interval: env.attempts_gc_interval,
    };
    let (delivery_attempts_service, delivery_attempts_garbage_collector) =
        DeliveryAttemptsServiceImpl::new(config);
    let delivery_attempts_service = Arc::new(delivery_attempts_service);
    let delivery_attempts_garbage_collector_close_notify = Arc::new(Notify::new());
    let delivery_attempts_garbage_collector_handle = tokio::spawn(
        delivery_attempts_garbage_collector
            .run(Arc::clone(&delivery_attempts_garbage_collector_close_notify)),
    );

    let confirmations_service = ConfirmationsServiceImpl::new(
        tickets_repository,
        settlement_service,
        notifications_service.clone(),
    );
    let confirmations_service = Arc::new(confirmations_service);

    let config = PurchasesConsumerServiceConfig {
        exchange: env.rabbitmq_exchange_name.clone(),
        queue: env.rabbitmq_purchased_queue_name.clone(),
        max_in_flight: env.max_in_flight,
        max_delivery_attempts: env.max_delivery_attempts,
    };
    let purchases_consumer_service = PurchasesConsumerService::new(
        config,
        rabbitmq_connection.clone(),
        confirmations_service,
        delivery_attempts_service,
        dead_letter_service.clone(),
    )
    .await?;

    Ok(ApplicationState {
        db_client,
        rabbitmq_connection,
        purchases_consumer_service,
        notifications_service,
        dead_letter_service,
        delivery_attempts_garbage_collector_handle,
        delivery_attempts_garbage_collector_close_notify,
    })
}
