mod dto;
mod purchase_delivery_callback;
mod purchases_consumer_service;

pub use dto::PurchasesConsumerServiceConfig;
pub use purchases_consumer_service::*;
