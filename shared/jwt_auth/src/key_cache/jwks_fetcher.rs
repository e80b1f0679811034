use crate::JwkSet;
use async_trait::async_trait;

///
/// Source of the identity provider's key set
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JwksFetcher: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<JwkSet>;
}
