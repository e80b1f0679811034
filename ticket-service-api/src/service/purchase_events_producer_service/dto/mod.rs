mod purchase_events_producer_service_config;

pub use purchase_events_producer_service_config::PurchaseEventsProducerServiceConfig;
