use super::{TicketsService, TicketsServiceConfig};
use crate::{
    auth::Role, dto::input, error::Error,
    service::purchase_events_producer_service::PurchaseEventsProducerService,
};
use axum::async_trait;
use bson::oid::ObjectId;
use jwt_auth::{require_all_roles, User};
use std::{future::Future, sync::Arc};
use tickets::{
    message::PurchaseEvent,
    repository::{self, TicketsRepository},
    NewTicket, Ticket, TicketStatus,
};
use time::OffsetDateTime;

const MAX_QUANTITY: i64 = tickets::MAX_QUANTITY as i64;

pub struct TicketsServiceImpl {
    config: TicketsServiceConfig,
    repository: Arc<dyn TicketsRepository>,
    purchase_events_producer_service: Arc<dyn PurchaseEventsProducerService>,
}

impl TicketsServiceImpl {
    pub fn new(
        config: TicketsServiceConfig,
        repository: Arc<dyn TicketsRepository>,
        purchase_events_producer_service: Arc<dyn PurchaseEventsProducerService>,
    ) -> Self {
        Self {
            config,
            repository,
            purchase_events_producer_service,
        }
    }

    ///
    /// Runs database operation bounded by request timeout
    ///
    /// ### Errors
    /// - [Error::Timeout] when operation didn't finish in time
    /// - [Error::Database] when operation failed
    ///
    async fn with_deadline<T, F>(&self, operation: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, repository::Error>>,
    {
        let timeout = self.config.request_timeout;
        match tokio::time::timeout(timeout, operation).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::Timeout(timeout)),
        }
    }

    async fn find_owned(&self, user: &User, id: ObjectId) -> Result<Ticket, Error> {
        let ticket = self
            .with_deadline(self.repository.find(id))
            .await?
            .ok_or(Error::TicketNotExist)?;

        match ticket.owner_id == user.id {
            true => Ok(ticket),
            false => Err(Error::NotOwner),
        }
    }

    ///
    /// Publishes purchase event and marks ticket as published when broker confirms it.
    /// Errors are only logged, unpublished tickets are picked up by the relay
    ///
    async fn publish_purchase_event(&self, mut ticket: Ticket) -> Ticket {
        let published_at = OffsetDateTime::now_utc();
        let event = PurchaseEvent::from_ticket(&ticket, published_at);

        if let Err(err) = self.purchase_events_producer_service.produce(event).await {
            tracing::warn!(%err, "failed to publish purchase event");
            return ticket;
        }

        match self
            .with_deadline(self.repository.update_published_at(ticket.id, published_at))
            .await
        {
            Ok(()) => ticket.published_at = Some(published_at),
            Err(err) => tracing::warn!(%err, "failed to mark purchase event as published"),
        }

        ticket
    }
}

fn validate_purchase_request(request: &input::PurchaseRequest) -> Result<(), Error> {
    if request.event_id.trim().is_empty() {
        return Err(Error::Validation("event_id cannot be empty"));
    }
    if !(1..=MAX_QUANTITY).contains(&request.quantity) {
        return Err(Error::Validation("quantity must be in range 1..=10"));
    }
    if !request.total_price.is_finite() || request.total_price < 0.0 {
        return Err(Error::Validation("total_price must be a non-negative number"));
    }

    Ok(())
}

///
/// Error reported when ticket in `status` can't be cancelled
///
fn terminal_status_error(status: TicketStatus) -> Option<Error> {
    match status {
        TicketStatus::Pending => None,
        TicketStatus::Confirmed => Some(Error::AlreadyConfirmed),
        TicketStatus::Cancelled => Some(Error::AlreadyCancelled),
    }
}

#[async_trait]
impl TicketsService for TicketsServiceImpl {
    #[tracing::instrument(name = "Purchase", skip_all)]
    async fn purchase(
        &self,
        user: User,
        request: input::PurchaseRequest,
    ) -> Result<Ticket, Error> {
        validate_purchase_request(&request)?;

        let new_ticket = NewTicket {
            owner_id: user.id.clone(),
            event_id: request.event_id.trim().to_string(),
            quantity: request.quantity as u32,
            total_price: request.total_price,
            created_at: OffsetDateTime::now_utc(),
        };

        tracing::info!(event_id = new_ticket.event_id, "creating ticket");
        let ticket = self
            .with_deadline(self.repository.insert(new_ticket))
            .await?;
        tracing::info!(id = %ticket.id, "created ticket");

        Ok(self.publish_purchase_event(ticket).await)
    }

    async fn get(&self, user: User, id: ObjectId) -> Result<Ticket, Error> {
        self.find_owned(&user, id).await
    }

    async fn list_by_owner(&self, user: User) -> Result<Vec<Ticket>, Error> {
        self.with_deadline(self.repository.find_many_by_owner(&user.id))
            .await
    }

    async fn list_all(&self, user: User) -> Result<Vec<Ticket>, Error> {
        require_all_roles(&user, &[Role::ListAllTickets.as_ref()])?;

        self.with_deadline(self.repository.find_all()).await
    }

    #[tracing::instrument(name = "Cancel", skip_all, fields(%id))]
    async fn cancel(&self, user: User, id: ObjectId) -> Result<Ticket, Error> {
        let ticket = self.find_owned(&user, id).await?;
        if let Some(err) = terminal_status_error(ticket.status) {
            return Err(err);
        }

        let now = OffsetDateTime::now_utc();
        let update_result = self
            .with_deadline(self.repository.update_status(
                id,
                TicketStatus::Pending,
                TicketStatus::Cancelled,
                now,
            ))
            .await;

        match update_result {
            Ok(ticket) => {
                tracing::info!("cancelled ticket");
                Ok(ticket)
            }
            Err(Error::Database(repository::Error::NoDocumentUpdated)) => {
                // status changed after it was read
                let ticket = self
                    .with_deadline(self.repository.find(id))
                    .await?
                    .ok_or(Error::TicketNotExist)?;

                Err(terminal_status_error(ticket.status)
                    .unwrap_or(Error::Database(repository::Error::NoDocumentUpdated)))
            }
            Err(err) => Err(err),
        }
    }
}
