mod health;
mod ticket;

pub use health::*;
pub use ticket::*;
