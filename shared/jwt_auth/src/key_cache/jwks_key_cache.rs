use super::JwksFetcher;
use crate::{error::KeyCacheError, Jwk, JwkSet};
use anyhow::anyhow;
use jsonwebtoken::DecodingKey;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone)]
pub struct JwksKeyCacheConfig {
    /// Misses within this time after a successful reload don't trigger another one.
    /// [Duration::ZERO] reloads on every miss.
    pub min_reload_interval: Duration,
}

///
/// Cache of identity provider's signing keys indexed by `kid`.
///
/// Keys have no TTL. The whole key set is fetched again
/// only when a token refers to a `kid` that isn't cached.
///
pub struct JwksKeyCache {
    config: JwksKeyCacheConfig,
    fetcher: Box<dyn JwksFetcher>,

    keys: RwLock<HashMap<String, Arc<DecodingKey>>>,

    /// Held for the whole reload, so only one fetch runs at a time
    reload_state: Mutex<ReloadState>,
}

struct ReloadState {
    last_reload_at: Option<Instant>,
}

impl JwksKeyCache {
    pub fn new(config: JwksKeyCacheConfig, fetcher: Box<dyn JwksFetcher>) -> Self {
        Self {
            config,
            fetcher,
            keys: RwLock::new(HashMap::new()),
            reload_state: Mutex::new(ReloadState {
                last_reload_at: None,
            }),
        }
    }

    ///
    /// Fetches key set ahead of the first request.
    ///
    /// Failure is only logged, keys will be fetched again on the first miss.
    ///
    pub async fn preload(&self) {
        let mut reload_state = self.reload_state.lock().await;
        if let Err(err) = self.reload(&mut reload_state).await {
            tracing::warn!(%err, "preloading key set failed");
        }
    }

    ///
    /// Returns key with the given `kid`, reloading key set once when it's not cached.
    ///
    /// ### Errors
    /// - [KeyCacheError::NotFound] when key set doesn't contain the key even after reload
    /// - [KeyCacheError::Fetch] when key set couldn't be fetched
    ///
    pub async fn get_key(&self, kid: &str) -> Result<Arc<DecodingKey>, KeyCacheError> {
        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }

        let mut reload_state = self.reload_state.lock().await;

        // Key set could have been reloaded while waiting for the lock
        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }

        let reloaded_recently = reload_state
            .last_reload_at
            .is_some_and(|reloaded_at| reloaded_at.elapsed() < self.config.min_reload_interval);
        if reloaded_recently {
            tracing::debug!(kid, "key set reloaded recently, reload skipped");
            return Err(KeyCacheError::NotFound {
                kid: kid.to_string(),
            });
        }

        self.reload(&mut reload_state).await?;

        self.cached_key(kid)
            .await
            .ok_or_else(|| KeyCacheError::NotFound {
                kid: kid.to_string(),
            })
    }

    async fn cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        self.keys.read().await.get(kid).cloned()
    }

    async fn reload(&self, reload_state: &mut ReloadState) -> Result<(), KeyCacheError> {
        tracing::info!("reloading key set");

        let jwk_set = self.fetcher.fetch().await.map_err(|err| {
            tracing::warn!(%err, "fetching key set failed");
            KeyCacheError::Fetch(err)
        })?;

        let keys = decode_jwk_set(jwk_set);
        tracing::info!(count = keys.len(), "key set reloaded");

        *self.keys.write().await = keys;
        reload_state.last_reload_at = Some(Instant::now());

        Ok(())
    }
}

fn decode_jwk_set(jwk_set: JwkSet) -> HashMap<String, Arc<DecodingKey>> {
    let mut keys = HashMap::new();

    for value in jwk_set.keys {
        let decoded = serde_json::from_value::<Jwk>(value)
            .map_err(|err| anyhow!("malformed entry: {err}"))
            .and_then(decode_jwk);

        match decoded {
            Ok((kid, key)) => {
                keys.insert(kid, Arc::new(key));
            }
            Err(err) => tracing::debug!(%err, "key set entry skipped"),
        }
    }

    keys
}

fn decode_jwk(jwk: Jwk) -> anyhow::Result<(String, DecodingKey)> {
    if jwk.kty != "RSA" {
        return Err(anyhow!("unsupported key type {}", jwk.kty));
    }
    if jwk.key_use.as_deref() == Some("enc") {
        return Err(anyhow!("encryption key"));
    }

    let kid = jwk.kid.ok_or_else(|| anyhow!("missing kid"))?;
    let (Some(n), Some(e)) = (jwk.n, jwk.e) else {
        return Err(anyhow!("missing modulus or exponent of {kid}"));
    };
    let key = DecodingKey::from_rsa_components(&n, &e)
        .map_err(|err| anyhow!("invalid key {kid}: {err}"))?;

    Ok((kid, key))
}
