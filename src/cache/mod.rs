//! Advisory key/value cache used read-aside in front of the playlist store.
//!
//! Backends report their failures, [`CacheLayer`] turns read failures into
//! misses so callers never see a cache error as an application error.

mod memory;
mod redis_cache;

pub use memory::InMemoryCache;
pub use redis_cache::RedisCache;

use crate::config::{CacheBackendKind, CacheSettings};
use crate::metrics;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(Vec<u8>),
    Miss,
}

/// String-keyed storage of opaque byte blobs with optional TTL.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns Ok(None) if the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    /// With `ttl == None` the entry never expires on its own.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Short backend name, used in logs.
    fn name(&self) -> &'static str;
}

/// Backend used when caching is disabled: every read misses.
pub struct NoOpCache;

#[async_trait]
impl CacheBackend for NoOpCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Option<Duration>) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Fail-soft front of a [`CacheBackend`].
#[derive(Clone)]
pub struct CacheLayer {
    backend: Arc<dyn CacheBackend>,
}

impl CacheLayer {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Reads `key`. Any backend failure is logged and reported as a miss.
    pub async fn get(&self, key: &str) -> CacheLookup {
        match self.backend.get(key).await {
            Ok(Some(value)) => {
                debug!(key = %key, backend = self.backend.name(), "cache hit");
                metrics::record_cache_request("hit");
                CacheLookup::Hit(value)
            }
            Ok(None) => {
                debug!(key = %key, backend = self.backend.name(), "cache miss");
                metrics::record_cache_request("miss");
                CacheLookup::Miss
            }
            Err(e) => {
                warn!(key = %key, backend = self.backend.name(), error = %e, "cache read failed, treating as miss");
                metrics::record_cache_error("get");
                metrics::record_cache_request("miss");
                CacheLookup::Miss
            }
        }
    }

    /// Best-effort write. The error is returned so the caller can log it in
    /// the context of its own operation.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        self.backend
            .set(key, value, ttl)
            .await
            .inspect_err(|_| metrics::record_cache_error("set"))
    }

    /// Best-effort delete, same error contract as [`CacheLayer::set`].
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.backend
            .delete(key)
            .await
            .inspect_err(|_| metrics::record_cache_error("delete"))
    }
}

/// Builds the backend selected by the configuration.
pub fn create_cache_backend(settings: &CacheSettings) -> Result<Arc<dyn CacheBackend>> {
    let backend: Arc<dyn CacheBackend> = match settings.backend {
        CacheBackendKind::Memory => Arc::new(InMemoryCache::new()),
        CacheBackendKind::Redis => {
            let url = settings
                .redis_url
                .as_deref()
                .context("Redis cache backend selected but no redis url configured")?;
            Arc::new(RedisCache::from_url(url)?)
        }
        CacheBackendKind::Disabled => Arc::new(NoOpCache),
    };
    Ok(backend)
}
