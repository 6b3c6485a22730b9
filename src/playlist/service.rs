//! Ownership-guarded, cache-accelerated playlist operations.
//!
//! Every playlist-scoped call runs the [`OwnershipGate`] first and aborts
//! before touching cache or store when it fails. Song listings are cached
//! read-aside under [`playlist_songs_cache_key`]; membership mutations delete
//! that entry (never update it) once the store write succeeded.

use super::error::PlaylistError;
use super::models::{PlaylistSong, PlaylistSummary};
use super::ownership::OwnershipGate;
use super::repository::PlaylistRepository;
use crate::cache::{CacheLayer, CacheLookup};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub fn playlist_songs_cache_key(playlist_id: &str) -> String {
    format!("playlistsongs:{}", playlist_id)
}

pub struct PlaylistService {
    repository: Arc<dyn PlaylistRepository>,
    gate: OwnershipGate,
    cache: CacheLayer,
    listing_ttl: Option<Duration>,
}

impl PlaylistService {
    pub fn new(
        repository: Arc<dyn PlaylistRepository>,
        gate: OwnershipGate,
        cache: CacheLayer,
        listing_ttl: Option<Duration>,
    ) -> Self {
        Self {
            repository,
            gate,
            cache,
            listing_ttl,
        }
    }

    pub fn gate(&self) -> &OwnershipGate {
        &self.gate
    }

    pub fn add_playlist(&self, name: &str, owner_id: &str) -> Result<String, PlaylistError> {
        let playlist_id = self
            .repository
            .insert_playlist(name, owner_id)?
            .ok_or_else(|| {
                PlaylistError::Storage(anyhow::anyhow!("Failed to create playlist {}", name))
            })?;
        info!("Created playlist {} for {}", playlist_id, owner_id);
        Ok(playlist_id)
    }

    /// An owner without playlists gets an empty list.
    pub fn list_playlists_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<PlaylistSummary>, PlaylistError> {
        Ok(self.repository.list_playlists_by_owner(owner_id)?)
    }

    pub async fn delete_playlist(
        &self,
        playlist_id: &str,
        caller_id: &str,
    ) -> Result<(), PlaylistError> {
        self.gate.verify_owner(playlist_id, caller_id)?;

        if self.repository.delete_playlist(playlist_id)? == 0 {
            return Err(PlaylistError::NotFound(format!(
                "Playlist {} not found",
                playlist_id
            )));
        }
        info!("Deleted playlist {}", playlist_id);
        self.invalidate_songs(playlist_id).await;
        Ok(())
    }

    /// Returns the id of the new membership entry.
    pub async fn add_song_to_playlist(
        &self,
        playlist_id: &str,
        song_id: &str,
        caller_id: &str,
    ) -> Result<String, PlaylistError> {
        self.gate.verify_owner(playlist_id, caller_id)?;

        if !self.repository.song_exists(song_id)? {
            return Err(PlaylistError::NotFound(format!("Song {} not found", song_id)));
        }

        let entry_id = self
            .repository
            .insert_playlist_song(playlist_id, song_id)?
            .ok_or_else(|| {
                PlaylistError::InvariantViolation(format!(
                    "Failed to add song {} to playlist {}",
                    song_id, playlist_id
                ))
            })?;
        debug!("add_song_to_playlist({playlist_id}, {song_id}) -> {entry_id}");

        self.invalidate_songs(playlist_id).await;
        Ok(entry_id)
    }

    /// Fails `NotFound` when the playlist has no songs.
    pub async fn get_playlist_songs(
        &self,
        playlist_id: &str,
        caller_id: &str,
    ) -> Result<Vec<PlaylistSong>, PlaylistError> {
        self.gate.verify_owner(playlist_id, caller_id)?;

        let key = playlist_songs_cache_key(playlist_id);
        if let CacheLookup::Hit(bytes) = self.cache.get(&key).await {
            match serde_json::from_slice::<Vec<PlaylistSong>>(&bytes) {
                Ok(songs) if !songs.is_empty() => return Ok(songs),
                // Never written by this service, an empty listing is NotFound
                Ok(_) => debug!(key = %key, "Ignoring empty cached playlist songs"),
                Err(e) => {
                    warn!(key = %key, error = %e, "Malformed cached playlist songs, reading from store");
                }
            }
        }

        let songs = self.repository.list_playlist_songs(playlist_id)?;
        if songs.is_empty() {
            return Err(PlaylistError::NotFound(format!(
                "Playlist {} has no songs",
                playlist_id
            )));
        }

        match serde_json::to_vec(&songs) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(&key, bytes, self.listing_ttl).await {
                    warn!(key = %key, error = %e, "Failed to cache playlist songs");
                }
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to serialize playlist songs"),
        }
        Ok(songs)
    }

    pub async fn remove_song_from_playlist(
        &self,
        playlist_id: &str,
        song_id: &str,
        caller_id: &str,
    ) -> Result<(), PlaylistError> {
        self.gate.verify_owner(playlist_id, caller_id)?;

        let removed = self.repository.delete_playlist_song(playlist_id, song_id)?;
        if removed == 0 {
            return Err(PlaylistError::InvariantViolation(format!(
                "Song {} is not in playlist {}",
                song_id, playlist_id
            )));
        }
        debug!("remove_song_from_playlist({playlist_id}, {song_id}) removed {removed} entries");

        self.invalidate_songs(playlist_id).await;
        Ok(())
    }

    /// Always attempted, whether or not this instance ever cached the listing.
    async fn invalidate_songs(&self, playlist_id: &str) {
        let key = playlist_songs_cache_key(playlist_id);
        if let Err(e) = self.cache.delete(&key).await {
            warn!(key = %key, error = %e, "Failed to invalidate playlist songs cache");
        }
    }
}
