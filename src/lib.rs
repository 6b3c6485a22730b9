//! Pezzottify playlists library
//!
//! Ownership-checked playlist management with a read-aside song listing cache
//! and queue-backed playlist exports.

pub mod cache;
pub mod config;
pub mod export;
pub mod metrics;
pub mod playlist;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use cache::{create_cache_backend, CacheBackend, CacheLayer, CacheLookup};
pub use config::{AppConfig, CliConfig, FileConfig};
pub use export::{AmqpPublisher, ExportDispatcher, ExportJobMessage, QueuePublisher};
pub use playlist::{
    OwnershipGate, PlaylistError, PlaylistRepository, PlaylistService, SqlitePlaylistStore,
};
