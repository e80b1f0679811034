mod dead_letter_service_config;

pub use dead_letter_service_config::DeadLetterServiceConfig;
