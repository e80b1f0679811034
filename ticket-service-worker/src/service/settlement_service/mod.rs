mod dto;
mod settlement_service;
mod settlement_service_impl;

pub use dto::SettlementServiceConfig;
pub use settlement_service::*;
pub use settlement_service_impl::*;
