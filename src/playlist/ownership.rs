use super::error::PlaylistError;
use super::repository::PlaylistRepository;
use std::sync::Arc;
use tracing::debug;

/// Guard run before any playlist-scoped read or mutation.
///
/// Shared by [`super::PlaylistService`] and [`crate::export::ExportDispatcher`]
/// so both paths apply the same check.
#[derive(Clone)]
pub struct OwnershipGate {
    repository: Arc<dyn PlaylistRepository>,
}

impl OwnershipGate {
    pub fn new(repository: Arc<dyn PlaylistRepository>) -> Self {
        Self { repository }
    }

    /// Succeeds iff the playlist exists and is owned by `caller_id`.
    pub fn verify_owner(&self, playlist_id: &str, caller_id: &str) -> Result<(), PlaylistError> {
        let playlist = self
            .repository
            .get_playlist(playlist_id)?
            .ok_or_else(|| PlaylistError::NotFound(format!("Playlist {} not found", playlist_id)))?;

        if playlist.owner_id != caller_id {
            debug!("verify_owner({playlist_id}) rejected caller {caller_id}");
            return Err(PlaylistError::Forbidden(format!(
                "User {} does not own playlist {}",
                caller_id, playlist_id
            )));
        }
        Ok(())
    }
}
