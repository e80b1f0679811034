mod claims;
mod jwk_set;
mod user;

pub use claims::Claims;
pub use jwk_set::{Jwk, JwkSet};
pub use user::{InnerUser, User};
