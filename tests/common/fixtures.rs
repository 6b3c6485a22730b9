use super::constants::*;
use super::publisher::RecordingPublisher;
use pezzottify_playlists::cache::{CacheBackend, CacheLayer, InMemoryCache};
use pezzottify_playlists::export::ExportDispatcher;
use pezzottify_playlists::playlist::{
    NewSong, OwnershipGate, PlaylistRepository, PlaylistService, SqlitePlaylistStore,
};
use std::sync::Arc;
use tempfile::TempDir;

/// A fully wired playlist stack on a temporary database.
///
/// The store, cache and publisher are exposed so tests can look behind the
/// service and dispatcher.
pub struct TestEnv {
    pub repository: Arc<dyn PlaylistRepository>,
    pub cache: Arc<InMemoryCache>,
    pub publisher: Arc<RecordingPublisher>,
    pub service: PlaylistService,
    pub dispatcher: ExportDispatcher,
    pub owner_id: String,
    pub other_id: String,
    pub song_1_id: String,
    pub song_2_id: String,
    _temp_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(InMemoryCache::new()))
    }

    /// Builds an environment on top of an existing cache, as a second service
    /// instance sharing the same cache server would be.
    pub fn with_cache(cache: Arc<InMemoryCache>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SqlitePlaylistStore::new(temp_dir.path().join("playlists.db"))
            .expect("Failed to create playlist store");
        let repository: Arc<dyn PlaylistRepository> = Arc::new(store);

        let owner_id = repository.insert_user(OWNER_USERNAME).unwrap();
        let other_id = repository.insert_user(OTHER_USERNAME).unwrap();
        let song_1_id = repository
            .insert_song(&NewSong::new(SONG_1_TITLE, 1998, SONG_1_PERFORMER))
            .unwrap();
        let song_2_id = repository
            .insert_song(&NewSong::new(SONG_2_TITLE, 2003, SONG_2_PERFORMER))
            .unwrap();

        let gate = OwnershipGate::new(repository.clone());
        let backend: Arc<dyn CacheBackend> = cache.clone();
        let service = PlaylistService::new(
            repository.clone(),
            gate.clone(),
            CacheLayer::new(backend),
            None,
        );
        let publisher = Arc::new(RecordingPublisher::default());
        let dispatcher = ExportDispatcher::new(gate, publisher.clone(), EXPORT_QUEUE);

        Self {
            repository,
            cache,
            publisher,
            service,
            dispatcher,
            owner_id,
            other_id,
            song_1_id,
            song_2_id,
            _temp_dir: temp_dir,
        }
    }
}
