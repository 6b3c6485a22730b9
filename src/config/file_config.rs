use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,

    pub cache: Option<CacheConfig>,
    pub broker: Option<BrokerConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache backend to use: "memory", "redis", "none"
    pub backend: Option<String>,
    pub redis_url: Option<String>,
    /// TTL of playlist song listings, 0 disables expiry.
    pub ttl_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BrokerConfig {
    pub amqp_url: Option<String>,
    pub export_queue: Option<String>,
    pub confirm_timeout_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
