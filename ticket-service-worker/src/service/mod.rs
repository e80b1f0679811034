pub mod confirmations_service;
pub mod dead_letter_service;
pub mod delivery_attempts_service;
pub mod notifications_service;
pub mod purchases_consumer_service;
pub mod settlement_service;
