//!
//! All roles used within application
//!

use strum::AsRefStr;

#[derive(AsRefStr)]
pub enum Role {
    #[strum(serialize = "ticket_service_list_all_tickets")]
    ListAllTickets,
}
