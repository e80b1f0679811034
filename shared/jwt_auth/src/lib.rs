mod dto;
mod error;
mod functions;
mod key_cache;
mod middleware;
mod token_verifier;
mod util;


pub use dto::{InnerUser, Jwk, JwkSet, User};
pub use error::{AuthError, KeyCacheError, MissingRoleError};
pub use functions::require_all_roles;
pub use key_cache::{HttpJwksFetcher, JwksFetcher, JwksKeyCache, JwksKeyCacheConfig};
pub use middleware::JwtAuthLayer;
pub use token_verifier::{TokenVerifier, TokenVerifierConfig};
pub use util::parse_jwt_algorithms;
