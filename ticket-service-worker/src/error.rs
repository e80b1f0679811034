use std::time::Duration;
use tickets::repository;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ticket not exist")]
    TicketNotExist,

    #[error("settlement did not finish in {0:?}")]
    SettlementTimeout(Duration),

    #[error("database error: {0}")]
    Database(#[from] repository::Error),
}
