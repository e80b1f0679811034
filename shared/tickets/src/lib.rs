pub mod message;
pub mod repository;
mod status;
mod ticket;

pub use status::TicketStatus;
pub use ticket::{NewTicket, Ticket, MAX_QUANTITY};
