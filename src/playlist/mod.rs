//! Playlists: persistence, the ownership gate and the cached service layer.

mod error;
mod models;
mod ownership;
mod repository;
mod service;
mod sqlite_playlist_store;

pub use error::PlaylistError;
pub use models::{NewSong, Playlist, PlaylistSong, PlaylistSummary};
pub use ownership::OwnershipGate;
#[cfg(any(test, feature = "mock"))]
pub use repository::MockPlaylistRepository;
pub use repository::PlaylistRepository;
pub use service::{playlist_songs_cache_key, PlaylistService};
pub use sqlite_playlist_store::{SqlitePlaylistStore, VERSIONED_SCHEMAS};
