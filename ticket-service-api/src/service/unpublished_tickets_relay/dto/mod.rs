mod unpublished_tickets_relay_config;

pub use unpublished_tickets_relay_config::UnpublishedTicketsRelayConfig;
