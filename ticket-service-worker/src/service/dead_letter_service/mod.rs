mod dead_letter_service;
mod dead_letter_service_impl;
mod dto;

pub use dead_letter_service::*;
pub use dead_letter_service_impl::*;
pub use dto::DeadLetterServiceConfig;
