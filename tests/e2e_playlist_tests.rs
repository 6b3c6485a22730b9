//! End-to-end tests for playlist management through the cached service

mod common;

use common::*;
use pezzottify_playlists::cache::CacheBackend;
use pezzottify_playlists::playlist::{playlist_songs_cache_key, PlaylistError, PlaylistSong};
use std::sync::Arc;

#[tokio::test]
async fn test_road_trip_scenario() {
    let env = TestEnv::new();

    let playlist_id = env.service.add_playlist("Road Trip", &env.owner_id).unwrap();
    assert!(playlist_id.starts_with("playlist-"));

    env.service
        .add_song_to_playlist(&playlist_id, &env.song_1_id, &env.owner_id)
        .await
        .unwrap();

    // First read goes to the store and populates the cache
    let songs = env
        .service
        .get_playlist_songs(&playlist_id, &env.owner_id)
        .await
        .unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].id, env.song_1_id);
    assert_eq!(songs[0].title, SONG_1_TITLE);
    assert_eq!(songs[0].performer, SONG_1_PERFORMER);

    // A write behind the service's back stays invisible while the cache holds the listing
    env.repository
        .insert_playlist_song(&playlist_id, &env.song_2_id)
        .unwrap();
    let cached = env
        .service
        .get_playlist_songs(&playlist_id, &env.owner_id)
        .await
        .unwrap();
    assert_eq!(cached, songs);
    env.repository
        .delete_playlist_song(&playlist_id, &env.song_2_id)
        .unwrap();

    env.service
        .remove_song_from_playlist(&playlist_id, &env.song_1_id, &env.owner_id)
        .await
        .unwrap();

    let err = env
        .service
        .get_playlist_songs(&playlist_id, &env.owner_id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_added_song_is_visible_regardless_of_cache_state() {
    let env = TestEnv::new();
    let playlist_id = env.service.add_playlist("Mixed", &env.owner_id).unwrap();
    env.service
        .add_song_to_playlist(&playlist_id, &env.song_1_id, &env.owner_id)
        .await
        .unwrap();

    // Warm cache
    env.service
        .get_playlist_songs(&playlist_id, &env.owner_id)
        .await
        .unwrap();
    env.service
        .add_song_to_playlist(&playlist_id, &env.song_2_id, &env.owner_id)
        .await
        .unwrap();
    let songs = env
        .service
        .get_playlist_songs(&playlist_id, &env.owner_id)
        .await
        .unwrap();
    assert!(songs.iter().any(|s| s.id == env.song_2_id));

    // Cold cache
    env.cache.delete(&playlist_songs_cache_key(&playlist_id)).await.unwrap();
    let songs = env
        .service
        .get_playlist_songs(&playlist_id, &env.owner_id)
        .await
        .unwrap();
    assert_eq!(songs.len(), 2);
}

#[tokio::test]
async fn test_removal_invalidates_entry_primed_by_another_instance() {
    let env = TestEnv::new();
    let playlist_id = env.service.add_playlist("Shared", &env.owner_id).unwrap();
    env.service
        .add_song_to_playlist(&playlist_id, &env.song_1_id, &env.owner_id)
        .await
        .unwrap();
    env.service
        .add_song_to_playlist(&playlist_id, &env.song_2_id, &env.owner_id)
        .await
        .unwrap();

    // A second instance sharing the cache reads the playlist first
    let other_instance = TestEnv::with_cache(env.cache.clone());
    let primed = vec![
        PlaylistSong {
            id: env.song_1_id.clone(),
            title: SONG_1_TITLE.to_string(),
            performer: SONG_1_PERFORMER.to_string(),
        },
        PlaylistSong {
            id: env.song_2_id.clone(),
            title: SONG_2_TITLE.to_string(),
            performer: SONG_2_PERFORMER.to_string(),
        },
    ];
    let backend: Arc<dyn CacheBackend> = other_instance.cache.clone();
    backend
        .set(
            &playlist_songs_cache_key(&playlist_id),
            serde_json::to_vec(&primed).unwrap(),
            None,
        )
        .await
        .unwrap();

    env.service
        .remove_song_from_playlist(&playlist_id, &env.song_1_id, &env.owner_id)
        .await
        .unwrap();

    let songs = env
        .service
        .get_playlist_songs(&playlist_id, &env.owner_id)
        .await
        .unwrap();
    assert!(songs.iter().all(|s| s.id != env.song_1_id));
    assert_eq!(songs.len(), 1);
}

#[tokio::test]
async fn test_duplicate_entries_are_listed_and_removed_together() {
    let env = TestEnv::new();
    let playlist_id = env.service.add_playlist("Repeat", &env.owner_id).unwrap();
    for _ in 0..2 {
        env.service
            .add_song_to_playlist(&playlist_id, &env.song_1_id, &env.owner_id)
            .await
            .unwrap();
    }

    let songs = env
        .service
        .get_playlist_songs(&playlist_id, &env.owner_id)
        .await
        .unwrap();
    assert_eq!(songs.len(), 2);

    env.service
        .remove_song_from_playlist(&playlist_id, &env.song_1_id, &env.owner_id)
        .await
        .unwrap();
    let err = env
        .service
        .remove_song_from_playlist(&playlist_id, &env.song_1_id, &env.owner_id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaylistError::InvariantViolation(_)));
}

#[tokio::test]
async fn test_other_user_cannot_touch_playlist() {
    let env = TestEnv::new();
    let playlist_id = env.service.add_playlist("Private", &env.owner_id).unwrap();
    env.service
        .add_song_to_playlist(&playlist_id, &env.song_1_id, &env.owner_id)
        .await
        .unwrap();

    assert!(env
        .service
        .get_playlist_songs(&playlist_id, &env.other_id)
        .await
        .unwrap_err()
        .is_forbidden());
    assert!(env
        .service
        .add_song_to_playlist(&playlist_id, &env.song_2_id, &env.other_id)
        .await
        .unwrap_err()
        .is_forbidden());
    assert!(env
        .service
        .remove_song_from_playlist(&playlist_id, &env.song_1_id, &env.other_id)
        .await
        .unwrap_err()
        .is_forbidden());
    assert!(env
        .service
        .delete_playlist(&playlist_id, &env.other_id)
        .await
        .unwrap_err()
        .is_forbidden());

    // Nothing changed for the owner
    let songs = env
        .service
        .get_playlist_songs(&playlist_id, &env.owner_id)
        .await
        .unwrap();
    assert_eq!(songs.len(), 1);
}

#[tokio::test]
async fn test_owner_listing_and_delete() {
    let env = TestEnv::new();
    assert!(env
        .service
        .list_playlists_by_owner(&env.owner_id)
        .unwrap()
        .is_empty());

    let first = env.service.add_playlist("First", &env.owner_id).unwrap();
    let second = env.service.add_playlist("Second", &env.owner_id).unwrap();
    env.service.add_playlist("Theirs", &env.other_id).unwrap();

    let playlists = env.service.list_playlists_by_owner(&env.owner_id).unwrap();
    let ids: Vec<_> = playlists.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);
    assert!(playlists.iter().all(|p| p.username == OWNER_USERNAME));

    env.service.delete_playlist(&first, &env.owner_id).await.unwrap();
    let playlists = env.service.list_playlists_by_owner(&env.owner_id).unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].id, second);

    assert!(env
        .service
        .delete_playlist(&first, &env.owner_id)
        .await
        .unwrap_err()
        .is_not_found());
}
