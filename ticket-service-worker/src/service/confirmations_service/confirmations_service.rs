use super::ConfirmationOutcome;
use crate::error::Error;
use async_trait::async_trait;
use tickets::message::PurchaseEvent;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmationsService: Send + Sync {
    ///
    /// Settles purchase and confirms pending ticket.
    /// Deliveries of the same event can be repeated safely
    ///
    /// ### Errors
    /// - [Error::TicketNotExist]
    /// - [Error::SettlementTimeout]
    /// - [Error::Database]
    ///
    async fn confirm(&self, event: PurchaseEvent) -> Result<ConfirmationOutcome, Error>;
}
