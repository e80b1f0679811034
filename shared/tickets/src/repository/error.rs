use crate::TicketStatus;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no document updated")]
    NoDocumentUpdated,

    #[error("invalid status transition {} -> {}", from.as_ref(), to.as_ref())]
    InvalidTransition {
        from: TicketStatus,
        to: TicketStatus,
    },

    #[error("mongo error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}
