use amqprs::{
    channel::{BasicGetArguments, BasicPublishArguments, Channel},
    connection::{Connection, OpenConnectionArguments},
    BasicProperties,
};
use bson::oid::ObjectId;
use std::{sync::Once, time::Duration};
use tickets::{
    repository::{TicketsRepository, TicketsRepositoryImpl},
    NewTicket, Ticket, TicketStatus,
};
use time::OffsetDateTime;
use tokio::time::timeout;

static INIT_ENV_ONCE: Once = Once::new();

pub fn init_env() {
    INIT_ENV_ONCE.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

fn env_var(name: &str) -> String {
    std::env::var(name).unwrap()
}

pub fn exchange() -> String {
    env_var("TICKET_SERVICE_WORKER_RABBITMQ_EXCHANGE_NAME")
}

pub fn purchased_queue() -> String {
    env_var("TICKET_SERVICE_WORKER_RABBITMQ_PURCHASED_QUEUE_NAME")
}

pub fn confirmed_queue() -> String {
    env_var("TICKET_SERVICE_WORKER_RABBITMQ_CONFIRMED_QUEUE_NAME")
}

pub fn dead_letter_queue() -> String {
    format!("{}.dead-letter", purchased_queue())
}

pub async fn tickets_repository() -> TicketsRepositoryImpl {
    let client =
        mongodb::Client::with_uri_str(env_var("TICKET_SERVICE_WORKER_DB_CONNECTION_STRING"))
            .await
            .unwrap();
    let db = client.database(&env_var("TICKET_SERVICE_WORKER_DB_NAME"));

    TicketsRepositoryImpl::new(db).await.unwrap()
}

pub async fn insert_pending_ticket(repository: &TicketsRepositoryImpl) -> Ticket {
    repository
        .insert(NewTicket {
            owner_id: ObjectId::new().to_hex(),
            event_id: "evt-1".to_string(),
            quantity: 2,
            total_price: 49.98,
            created_at: OffsetDateTime::now_utc(),
        })
        .await
        .unwrap()
}

pub async fn init_rabbitmq() -> (Connection, Channel) {
    let args = OpenConnectionArguments::try_from(
        env_var("TICKET_SERVICE_WORKER_RABBITMQ_CONNECTION_STRING").as_str(),
    )
    .unwrap();
    let connection = Connection::open(&args).await.unwrap();
    let channel = connection.open_channel(None).await.unwrap();

    (connection, channel)
}

pub async fn destroy_rabbitmq(connection: Connection, channel: Channel) {
    channel.close().await.unwrap();
    connection.close().await.unwrap();
}

pub async fn publish_purchase(channel: &Channel, content: Vec<u8>) {
    let basic_properties = BasicProperties::default().with_persistence(true).finish();
    let args = BasicPublishArguments::new(&exchange(), &purchased_queue());

    channel
        .basic_publish(basic_properties, content, args)
        .await
        .unwrap();
}

///
/// Fetches messages from queue until one satisfies predicate.
/// Other messages stay unacked and return to queue when channel is closed
///
pub async fn find_message(
    channel: &Channel,
    queue: &str,
    predicate: impl Fn(&[u8]) -> bool,
) -> Vec<u8> {
    timeout(Duration::from_secs(15), async {
        loop {
            let args = BasicGetArguments::new(queue);
            match channel.basic_get(args).await.unwrap() {
                Some((_get_ok, _basic_properties, content)) if predicate(&content) => {
                    return content
                }
                Some(_) => {}
                None => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }
    })
    .await
    .unwrap()
}

pub async fn wait_for_status(
    repository: &TicketsRepositoryImpl,
    id: ObjectId,
    status: TicketStatus,
) -> Ticket {
    timeout(Duration::from_secs(10), async {
        loop {
            let ticket = repository.find(id).await.unwrap().unwrap();
            if ticket.status == status {
                return ticket;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await
    .unwrap()
}
