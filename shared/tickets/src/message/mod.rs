//! Protobuf messages exchanged between the api and the worker.

mod purchase_event;
mod ticket_confirmed;
mod timestamp;

pub use purchase_event::*;
pub use ticket_confirmed::*;
pub use timestamp::*;

pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";
