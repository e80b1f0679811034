mod dto;
mod health_service;
mod health_service_impl;

pub use dto::{DatabaseStatus, HealthServiceConfig};
pub use health_service::*;
pub use health_service_impl::*;
