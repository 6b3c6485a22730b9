use super::models::{NewSong, Playlist, PlaylistSong, PlaylistSummary};
use anyhow::Result;

/// Persistence primitives for users, catalog songs, playlists and playlist
/// membership. No ownership checks happen at this level.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait PlaylistRepository: Send + Sync {
    /// Creates a new user and returns the generated user id.
    fn insert_user(&self, username: &str) -> Result<String>;

    /// Adds a song to the catalog and returns the generated song id.
    fn insert_song(&self, song: &NewSong) -> Result<String>;

    /// Returns whether a catalog song with the given id exists.
    fn song_exists(&self, song_id: &str) -> Result<bool>;

    /// Returns a playlist given its id.
    /// Returns Ok(None) if the playlist does not exist.
    /// Returns Err if there is a database error.
    fn get_playlist(&self, playlist_id: &str) -> Result<Option<Playlist>>;

    /// Creates a playlist and returns the id reported back by the insert.
    /// Returns Ok(None) if the insert did not yield an id.
    fn insert_playlist(&self, name: &str, owner_id: &str) -> Result<Option<String>>;

    /// Returns the owner's playlists in creation order, joined with the
    /// owner's username.
    fn list_playlists_by_owner(&self, owner_id: &str) -> Result<Vec<PlaylistSummary>>;

    /// Deletes a playlist and, through the foreign key cascade, its
    /// membership entries. Returns the number of playlists deleted.
    fn delete_playlist(&self, playlist_id: &str) -> Result<usize>;

    /// Adds a membership entry and returns the id reported back by the insert.
    /// Returns Ok(None) if the insert did not yield an id.
    fn insert_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<Option<String>>;

    /// Returns the songs of a playlist joined with the catalog, in insertion
    /// order. Duplicated entries are listed once per entry.
    fn list_playlist_songs(&self, playlist_id: &str) -> Result<Vec<PlaylistSong>>;

    /// Deletes every membership entry matching (playlist_id, song_id).
    /// Returns the number of entries deleted.
    fn delete_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<usize>;
}
