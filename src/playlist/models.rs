//! Playlist data models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner_id: String,
}

/// A row of an owner's playlist listing, joined with the owner's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub username: String,
}

/// A song as listed inside a playlist. This is also the shape stored in the
/// playlist songs cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSong {
    pub id: String,
    pub title: String,
    pub performer: String,
}

/// Catalog song fields needed to seed the `song` table.
#[derive(Debug, Clone)]
pub struct NewSong {
    pub title: String,
    pub year: u32,
    pub performer: String,
    pub genre: Option<String>,
    pub duration: Option<u32>,
}

impl NewSong {
    pub fn new<T: Into<String>, P: Into<String>>(title: T, year: u32, performer: P) -> Self {
        Self {
            title: title.into(),
            year,
            performer: performer.into(),
            genre: None,
            duration: None,
        }
    }
}
