use crate::error::Error;
use async_trait::async_trait;
use tickets::message::PurchaseEvent;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettlementService: Send + Sync {
    ///
    /// Settles payment for the purchase.
    ///
    /// ### Errors
    /// - [Error::SettlementTimeout]
    ///
    async fn settle(&self, event: &PurchaseEvent) -> Result<(), Error>;
}
