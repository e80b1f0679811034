use super::Error;
use crate::{NewTicket, Ticket, TicketStatus};
use async_trait::async_trait;
use bson::oid::ObjectId;
use time::OffsetDateTime;

#[cfg_attr(any(test, feature = "test_utils"), mockall::automock)]
#[async_trait]
pub trait TicketsRepository: Send + Sync {
    ///
    /// Inserts new pending ticket that is not published yet
    ///
    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, Error>;

    async fn find(&self, id: ObjectId) -> Result<Option<Ticket>, Error>;

    ///
    /// Finds tickets of owner, newest first
    ///
    async fn find_many_by_owner(&self, owner_id: &str) -> Result<Vec<Ticket>, Error>;

    ///
    /// Finds all tickets, newest first
    ///
    async fn find_all(&self) -> Result<Vec<Ticket>, Error>;

    ///
    /// Atomically changes status of ticket from `from` to `to`
    /// and returns ticket after the update
    ///
    /// ### Errors
    /// - [Error::InvalidTransition] when `from` can't transition to `to`
    /// - [Error::NoDocumentUpdated] when
    ///     - ticket does not exist
    ///     - ticket status is not `from`
    ///
    async fn update_status(
        &self,
        id: ObjectId,
        from: TicketStatus,
        to: TicketStatus,
        updated_at: OffsetDateTime,
    ) -> Result<Ticket, Error>;

    ///
    /// Marks purchase event of ticket as published
    ///
    /// ### Errors
    /// - [Error::NoDocumentUpdated] when ticket does not exist
    ///
    async fn update_published_at(
        &self,
        id: ObjectId,
        published_at: OffsetDateTime,
    ) -> Result<(), Error>;

    ///
    /// Finds pending tickets created before `created_before`
    /// whose purchase event was never confirmed by the broker.
    /// Oldest first
    ///
    async fn find_many_unpublished(
        &self,
        created_before: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<Ticket>, Error>;

    async fn ping(&self) -> Result<(), Error>;
}
