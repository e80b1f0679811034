use crate::{dto::input, error::Error};
use axum::async_trait;
use bson::oid::ObjectId;
use jwt_auth::User;
use tickets::Ticket;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketsService: Send + Sync {
    ///
    /// Creates pending ticket owned by user and publishes purchase event.
    /// Failure to publish the event doesn't fail the purchase
    ///
    /// ### Errors
    /// - [Error::Validation] when request is invalid
    ///
    async fn purchase(&self, user: User, request: input::PurchaseRequest)
        -> Result<Ticket, Error>;

    ///
    /// ### Errors
    /// - [Error::TicketNotExist] when ticket does not exist
    /// - [Error::NotOwner] when ticket belongs to another user
    ///
    async fn get(&self, user: User, id: ObjectId) -> Result<Ticket, Error>;

    async fn list_by_owner(&self, user: User) -> Result<Vec<Ticket>, Error>;

    ///
    /// ### Errors
    /// - [Error::Auth] when user can't list tickets of other users
    ///
    async fn list_all(&self, user: User) -> Result<Vec<Ticket>, Error>;

    ///
    /// ### Errors
    /// - [Error::TicketNotExist] when ticket does not exist
    /// - [Error::NotOwner] when ticket belongs to another user
    /// - [Error::AlreadyCancelled] or [Error::AlreadyConfirmed]
    /// when ticket is not pending anymore
    ///
    async fn cancel(&self, user: User, id: ObjectId) -> Result<Ticket, Error>;
}
