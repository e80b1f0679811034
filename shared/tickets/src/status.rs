use serde::{Deserialize, Serialize};

///
/// Lifecycle of a ticket. `Pending` is the only state
/// that can be left, both other states are terminal.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl TicketStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TicketStatus::Pending)
    }

    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Pending, TicketStatus::Confirmed)
                | (TicketStatus::Pending, TicketStatus::Cancelled)
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pending_is_not_terminal() {
        assert!(!TicketStatus::Pending.is_terminal());
        assert!(TicketStatus::Confirmed.is_terminal());
        assert!(TicketStatus::Cancelled.is_terminal());
    }

    #[test]
    fn pending_transitions_to_terminal_states() {
        assert!(TicketStatus::Pending.can_transition_to(TicketStatus::Confirmed));
        assert!(TicketStatus::Pending.can_transition_to(TicketStatus::Cancelled));
    }

    #[test]
    fn terminal_states_never_transition() {
        let all = [
            TicketStatus::Pending,
            TicketStatus::Confirmed,
            TicketStatus::Cancelled,
        ];

        for next in all {
            assert!(!TicketStatus::Confirmed.can_transition_to(next));
            assert!(!TicketStatus::Cancelled.can_transition_to(next));
        }
        assert!(!TicketStatus::Pending.can_transition_to(TicketStatus::Pending));
    }

    #[test]
    fn status_names_are_lowercase() {
        assert_eq!(TicketStatus::Pending.as_ref(), "pending");
        assert_eq!(TicketStatus::Confirmed.as_ref(), "confirmed");
        assert_eq!(TicketStatus::Cancelled.as_ref(), "cancelled");
        assert_eq!(
            bson::to_bson(&TicketStatus::Cancelled).unwrap(),
            bson::Bson::String("cancelled".to_string())
        );
    }
}
