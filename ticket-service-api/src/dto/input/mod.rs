mod purchase_request;

pub use purchase_request::*;
