mod delivery_attempts_service;
mod delivery_attempts_service_garbage_collector;
mod delivery_attempts_service_impl;
mod dto;

pub use delivery_attempts_service::*;
pub use delivery_attempts_service_garbage_collector::*;
pub use delivery_attempts_service_impl::*;
pub use dto::{DeliveryAttempts, DeliveryAttemptsServiceConfig};
