mod purchases_consumer_service_config;

pub use purchases_consumer_service_config::PurchasesConsumerServiceConfig;
