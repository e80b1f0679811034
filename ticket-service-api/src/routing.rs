use crate::{
    application::{ApplicationMiddleware, ApplicationState},
    dto::{input, output},
    error::Error,
    service::{
        health_service::{DatabaseStatus, HealthService},
        tickets_service::TicketsService,
    },
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use bson::oid::ObjectId;
use jwt_auth::User;
use rabbitmq_client::RabbitmqConnectionStatus;
use std::{collections::BTreeMap, sync::Arc};

pub fn routing(application_middleware: &ApplicationMiddleware) -> Router<ApplicationState> {
    Router::new()
        .route("/tickets", get(get_all_tickets))
        .route("/tickets/purchase", post(purchase_ticket))
        .route("/tickets/my-tickets", get(get_my_tickets))
        .route("/tickets/:ticket_id", get(get_ticket).delete(cancel_ticket))
        .route_layer(application_middleware.auth.clone())
        .route("/health", get(health))
        .route("/health/db", get(health_db))
        .route("/health/broker", get(health_broker))
}

///
/// Invalid ids can't belong to any ticket
///
fn parse_ticket_id(ticket_id: &str) -> Result<ObjectId, Error> {
    ObjectId::parse_str(ticket_id).map_err(|_| Error::TicketNotExist)
}

async fn purchase_ticket(
    State(tickets_service): State<Arc<dyn TicketsService>>,
    Extension(user): Extension<User>,
    request: Result<Json<input::PurchaseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<output::Ticket>), Error> {
    let Json(request) = request?;

    let ticket = tickets_service.purchase(user, request).await?;

    Ok((StatusCode::CREATED, Json(ticket.into())))
}

async fn get_my_tickets(
    State(tickets_service): State<Arc<dyn TicketsService>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<output::Ticket>>, Error> {
    let tickets = tickets_service.list_by_owner(user).await?;

    Ok(Json(tickets.into_iter().map(output::Ticket::from).collect()))
}

async fn get_all_tickets(
    State(tickets_service): State<Arc<dyn TicketsService>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<output::Ticket>>, Error> {
    let tickets = tickets_service.list_all(user).await?;

    Ok(Json(tickets.into_iter().map(output::Ticket::from).collect()))
}

async fn get_ticket(
    State(tickets_service): State<Arc<dyn TicketsService>>,
    Extension(user): Extension<User>,
    Path(ticket_id): Path<String>,
) -> Result<Json<output::Ticket>, Error> {
    let id = parse_ticket_id(&ticket_id)?;

    let ticket = tickets_service.get(user, id).await?;

    Ok(Json(ticket.into()))
}

async fn cancel_ticket(
    State(tickets_service): State<Arc<dyn TicketsService>>,
    Extension(user): Extension<User>,
    Path(ticket_id): Path<String>,
) -> Result<Json<output::Ticket>, Error> {
    let id = parse_ticket_id(&ticket_id)?;

    let ticket = tickets_service.cancel(user, id).await?;

    Ok(Json(ticket.into()))
}

async fn health() -> Json<output::Health> {
    Json(output::Health {
        status: output::HEALTHY,
    })
}

async fn health_db(
    State(health_service): State<Arc<dyn HealthService>>,
) -> (StatusCode, Json<output::DependenciesHealth>) {
    let database_status = health_service.database_status().await;
    let healthy = database_status == DatabaseStatus::Connected;

    dependencies_health(healthy, "database", database_status.into())
}

async fn health_broker(
    State(health_service): State<Arc<dyn HealthService>>,
) -> (StatusCode, Json<output::DependenciesHealth>) {
    let broker_status = health_service.broker_status();
    let healthy = broker_status == RabbitmqConnectionStatus::Connected;

    dependencies_health(healthy, "broker", broker_status.as_str())
}

fn dependencies_health(
    healthy: bool,
    service: &'static str,
    service_status: &'static str,
) -> (StatusCode, Json<output::DependenciesHealth>) {
    let (status_code, status) = match healthy {
        true => (StatusCode::OK, output::HEALTHY),
        false => (StatusCode::SERVICE_UNAVAILABLE, output::UNHEALTHY),
    };

    let body = output::DependenciesHealth {
        status,
        services: BTreeMap::from([(service, service_status)]),
    };

    (status_code, Json(body))
}
