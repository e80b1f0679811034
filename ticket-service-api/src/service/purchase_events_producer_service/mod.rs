mod dto;
mod purchase_events_producer_service;
mod purchase_events_producer_service_impl;

pub use dto::PurchaseEventsProducerServiceConfig;
pub use purchase_events_producer_service::*;
pub use purchase_events_producer_service_impl::*;
