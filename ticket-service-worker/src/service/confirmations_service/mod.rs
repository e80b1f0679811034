mod confirmations_service;
mod confirmations_service_impl;
mod dto;
mod ticket_locks;

pub use confirmations_service::*;
pub use confirmations_service_impl::*;
pub use dto::ConfirmationOutcome;
pub use ticket_locks::TicketLocks;
