use super::{SettlementService, SettlementServiceConfig};
use crate::error::Error;
use async_trait::async_trait;
use tickets::message::PurchaseEvent;

///
/// Stub of the payment provider. It only waits
///
pub struct SettlementServiceImpl {
    config: SettlementServiceConfig,
}

impl SettlementServiceImpl {
    pub fn new(config: SettlementServiceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SettlementService for SettlementServiceImpl {
    #[tracing::instrument(
        name = "Settlement",
        skip_all,
        fields(
            ticket_id = %event.ticket_id,
            total_price = event.total_price,
        )
    )]
    async fn settle(&self, event: &PurchaseEvent) -> Result<(), Error> {
        tracing::debug!("settling payment");

        tokio::time::timeout(self.config.timeout, tokio::time::sleep(self.config.delay))
            .await
            .map_err(|_| Error::SettlementTimeout(self.config.timeout))?;

        tracing::debug!("payment settled");

        Ok(())
    }
}
