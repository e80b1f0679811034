mod settlement_service_config;

pub use settlement_service_config::SettlementServiceConfig;
