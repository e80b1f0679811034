mod http_jwks_fetcher;
mod jwks_fetcher;
mod jwks_key_cache;

pub use http_jwks_fetcher::HttpJwksFetcher;
pub use jwks_fetcher::JwksFetcher;
pub use jwks_key_cache::{JwksKeyCache, JwksKeyCacheConfig};

#[cfg(test)]
pub use jwks_fetcher::MockJwksFetcher;
