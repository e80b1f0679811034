mod common;
pub use common::*;

use prost::Message;
use serial_test::serial;
use std::time::Duration;
use tickets::{
    message::{PurchaseEvent, TicketConfirmedProtobuf},
    repository::TicketsRepository,
    TicketStatus,
};
use time::OffsetDateTime;

#[tokio::test]
#[serial]
#[ignore = "requires running worker, MongoDB and RabbitMQ"]
async fn pending_ticket_gets_confirmed() {
    // after publishing purchase event of pending ticket
    // ticket should become confirmed
    // and confirmation should be published to confirmed queue

    init_env();
    let repository = tickets_repository().await;
    let (connection, channel) = init_rabbitmq().await;

    let ticket = insert_pending_ticket(&repository).await;
    let event = PurchaseEvent::from_ticket(&ticket, OffsetDateTime::now_utc());
    publish_purchase(&channel, event.encode()).await;

    let confirmed = wait_for_status(&repository, ticket.id, TicketStatus::Confirmed).await;
    assert!(confirmed.updated_at >= ticket.created_at);

    let ticket_id = ticket.id.to_hex();
    let content = find_message(&channel, &confirmed_queue(), |content| {
        TicketConfirmedProtobuf::decode(content)
            .map(|message| message.ticket_id == ticket_id)
            .unwrap_or(false)
    })
    .await;
    let message = TicketConfirmedProtobuf::decode(content.as_slice()).unwrap();
    assert_eq!(message.owner_id, ticket.owner_id);
    assert_eq!(message.quantity, ticket.quantity);

    destroy_rabbitmq(connection, channel).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires running worker, MongoDB and RabbitMQ"]
async fn duplicate_delivery_keeps_first_confirmation() {
    // after publishing the same purchase event twice
    // ticket should be confirmed only once

    init_env();
    let repository = tickets_repository().await;
    let (connection, channel) = init_rabbitmq().await;

    let ticket = insert_pending_ticket(&repository).await;
    let event = PurchaseEvent::from_ticket(&ticket, OffsetDateTime::now_utc());
    publish_purchase(&channel, event.encode()).await;
    let confirmed = wait_for_status(&repository, ticket.id, TicketStatus::Confirmed).await;

    publish_purchase(&channel, event.encode()).await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    let ticket = repository.find(ticket.id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Confirmed);
    assert_eq!(ticket.updated_at, confirmed.updated_at);

    destroy_rabbitmq(connection, channel).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires running worker, MongoDB and RabbitMQ"]
async fn cancelled_ticket_stays_cancelled() {
    // after cancelling ticket before its purchase event is consumed
    // worker should ignore the event

    init_env();
    let repository = tickets_repository().await;
    let (connection, channel) = init_rabbitmq().await;

    let ticket = insert_pending_ticket(&repository).await;
    repository
        .update_status(
            ticket.id,
            TicketStatus::Pending,
            TicketStatus::Cancelled,
            OffsetDateTime::now_utc(),
        )
        .await
        .unwrap();

    let event = PurchaseEvent::from_ticket(&ticket, OffsetDateTime::now_utc());
    publish_purchase(&channel, event.encode()).await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    let ticket = repository.find(ticket.id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Cancelled);

    destroy_rabbitmq(connection, channel).await;
}
