use super::JwksFetcher;
use crate::JwkSet;
use async_trait::async_trait;
use std::time::Duration;

pub struct HttpJwksFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpJwksFetcher {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch(&self) -> anyhow::Result<JwkSet> {
        tracing::debug!(url = self.url, "fetching key set");

        let jwk_set = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;

        Ok(jwk_set)
    }
}
