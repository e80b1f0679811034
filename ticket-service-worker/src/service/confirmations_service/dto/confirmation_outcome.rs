use tickets::Ticket;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationOutcome {
    /// Ticket was pending and this delivery confirmed it
    Confirmed(Ticket),
    /// Duplicate delivery
    AlreadyConfirmed,
    /// Owner cancelled ticket before it was confirmed
    Cancelled,
}

impl ConfirmationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed(_) => "confirmed",
            Self::AlreadyConfirmed => "already_confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}
