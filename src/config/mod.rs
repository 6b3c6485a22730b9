mod file_config;

pub use file_config::{BrokerConfig, CacheConfig, FileConfig};

use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EXPORT_QUEUE: &str = "exports:playlist";
pub const DEFAULT_CONFIRM_TIMEOUT_MS: u64 = 1000;
/// Bounds how long a listing written by a read racing a mutation can be served.
pub const DEFAULT_CACHE_TTL_SEC: u64 = 1800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CacheBackendKind {
    #[default]
    Memory,
    Redis,
    #[value(name = "none")]
    Disabled,
}

fn parse_cache_backend(value: &str) -> Option<CacheBackendKind> {
    CacheBackendKind::from_str(value, true).ok()
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub cache_backend: CacheBackendKind,
    pub redis_url: Option<String>,
    pub cache_ttl_sec: u64,
    pub amqp_url: Option<String>,
    pub export_queue: String,
    pub confirm_timeout_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            cache_backend: CacheBackendKind::default(),
            redis_url: None,
            cache_ttl_sec: DEFAULT_CACHE_TTL_SEC,
            amqp_url: None,
            export_queue: DEFAULT_EXPORT_QUEUE.to_string(),
            confirm_timeout_ms: DEFAULT_CONFIRM_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub cache: CacheSettings,
    pub broker: BrokerSettings,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackendKind,
    pub redis_url: Option<String>,
    /// TTL applied to playlist song listings; None means no expiry.
    pub ttl: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub amqp_url: Option<String>,
    pub export_queue: String,
    pub confirm_timeout: Duration,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified via --db-path or in config file")
            })?;
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        let cache_file = file.cache.unwrap_or_default();
        let backend = match cache_file.backend {
            Some(name) => match parse_cache_backend(&name) {
                Some(backend) => backend,
                None => bail!("Unknown cache backend in config file: {}", name),
            },
            None => cli.cache_backend,
        };
        let redis_url = cache_file.redis_url.or_else(|| cli.redis_url.clone());
        if backend == CacheBackendKind::Redis && redis_url.is_none() {
            bail!("The redis cache backend requires --redis-url or cache.redis_url");
        }
        let ttl_sec = cache_file.ttl_sec.unwrap_or(cli.cache_ttl_sec);
        let cache = CacheSettings {
            backend,
            redis_url,
            ttl: (ttl_sec > 0).then(|| Duration::from_secs(ttl_sec)),
        };

        let broker_file = file.broker.unwrap_or_default();
        let export_queue = broker_file
            .export_queue
            .unwrap_or_else(|| cli.export_queue.clone());
        if export_queue.is_empty() {
            bail!("The export queue name cannot be empty");
        }
        let broker = BrokerSettings {
            amqp_url: broker_file.amqp_url.or_else(|| cli.amqp_url.clone()),
            export_queue,
            confirm_timeout: Duration::from_millis(
                broker_file
                    .confirm_timeout_ms
                    .unwrap_or(cli.confirm_timeout_ms),
            ),
        };

        Ok(Self {
            db_path,
            cache,
            broker,
        })
    }
}
