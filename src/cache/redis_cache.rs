use super::CacheBackend;
use anyhow::{Context, Result};
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use std::time::Duration;
use tracing::debug;

/// Redis cache backend, shared by every instance pointing at the same server.
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Builds a pool for `url`. No connection is opened until first use.
    pub fn from_url(url: &str) -> Result<Self> {
        let pool = Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .with_context(|| format!("Failed to create redis pool for {}", url))?;
        Ok(Self::new(pool))
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .context("Failed to get redis connection")
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let value = conn
            .get::<_, Option<Vec<u8>>>(key)
            .await
            .with_context(|| format!("Redis GET {} failed", key))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.connection().await?;
        match ttl {
            // SET EX rejects 0, sub-second TTLs are rounded up
            Some(ttl) => {
                let ttl_secs = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value.as_slice(), ttl_secs)
                    .await
                    .with_context(|| format!("Redis SET EX {} failed", key))?;
                debug!(key = %key, ttl_secs = %ttl_secs, "redis cache set");
            }
            None => {
                conn.set::<_, _, ()>(key, value.as_slice())
                    .await
                    .with_context(|| format!("Redis SET {} failed", key))?;
                debug!(key = %key, "redis cache set");
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key)
            .await
            .with_context(|| format!("Redis DEL {} failed", key))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheLayer, CacheLookup};
    use std::sync::Arc;

    // Nothing listens on port 1, every call fails to connect.
    const UNREACHABLE_URL: &str = "redis://127.0.0.1:1";

    #[tokio::test]
    async fn unreachable_server_reports_errors() {
        let cache = RedisCache::from_url(UNREACHABLE_URL).unwrap();
        assert!(cache.get("key").await.is_err());
        assert!(cache.set("key", b"v".to_vec(), None).await.is_err());
        assert!(cache.delete("key").await.is_err());
    }

    #[tokio::test]
    async fn unreachable_server_reads_as_miss_through_layer() {
        let layer = CacheLayer::new(Arc::new(RedisCache::from_url(UNREACHABLE_URL).unwrap()));
        assert_eq!(layer.get("playlistsongs:p1").await, CacheLookup::Miss);
    }
}
