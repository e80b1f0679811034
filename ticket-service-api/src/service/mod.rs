pub mod health_service;
pub mod purchase_events_producer_service;
pub mod tickets_service;
pub mod unpublished_tickets_relay;
