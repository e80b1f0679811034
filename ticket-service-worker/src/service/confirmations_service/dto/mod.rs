mod confirmation_outcome;

pub use confirmation_outcome::ConfirmationOutcome;
