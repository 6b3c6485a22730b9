use super::models::{NewSong, Playlist, PlaylistSong, PlaylistSummary};
use super::repository::PlaylistRepository;
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use anyhow::{anyhow, Context, Result};
use rand::{rng, Rng};
use rand_distr::Alphanumeric;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("username", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
};
const SONG_TABLE_V_0: Table = Table {
    name: "song",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("performer", &SqlType::Text, non_null = true),
        sqlite_column!("genre", &SqlType::Text),
        sqlite_column!("duration", &SqlType::Integer),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
};
const PLAYLIST_TABLE_V_0: Table = Table {
    name: "playlist",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!(
            "owner",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_playlist_owner", "owner")],
};
const PLAYLIST_SONG_TABLE_V_0: Table = Table {
    name: "playlist_song",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!(
            "playlist_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "playlist",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!(
            "song_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "song",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_playlist_song_playlist_id", "playlist_id")],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USER_TABLE_V_0,
        SONG_TABLE_V_0,
        PLAYLIST_TABLE_V_0,
        PLAYLIST_SONG_TABLE_V_0,
    ],
    migration: None,
}];

const ID_RANDOM_LEN: usize = 16;

/// A random A-z0-9 string
fn random_string(len: usize) -> String {
    let bytes = rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .collect::<Vec<u8>>();
    String::from_utf8_lossy(&bytes).to_string()
}

/// Generates a `<prefix>-<random>` id that is not already used in `table`.
fn unused_id(conn: &Connection, table: &Table, prefix: &str) -> Result<String> {
    loop {
        let candidate = format!("{}-{}", prefix, random_string(ID_RANDOM_LEN));
        let taken = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE id = ?1", table.name),
            params![candidate],
            |row| row.get::<usize, i64>(0),
        )? > 0;
        if !taken {
            return Ok(candidate);
        }
    }
}

/// SQLite implementation of [`PlaylistRepository`].
///
/// Cloning shares the same underlying connection.
#[derive(Clone)]
pub struct SqlitePlaylistStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePlaylistStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned(db_path, VERSIONED_SCHEMAS)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Playlist store connection mutex poisoned"))
    }

    fn insert_with_generated_id(
        &self,
        table: &Table,
        prefix: &str,
        sql: &str,
        values: &[&dyn rusqlite::ToSql],
    ) -> Result<Option<String>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = unused_id(&tx, table, prefix)?;

        let mut bound: Vec<&dyn rusqlite::ToSql> = vec![&id];
        bound.extend_from_slice(values);
        let inserted = tx
            .query_row(sql, bound.as_slice(), |row| row.get::<usize, String>(0))
            .optional()
            .with_context(|| format!("Could not insert into {}", table.name))?;

        tx.commit()?;
        Ok(inserted)
    }
}

impl PlaylistRepository for SqlitePlaylistStore {
    fn insert_user(&self, username: &str) -> Result<String> {
        self.insert_with_generated_id(
            &USER_TABLE_V_0,
            "user",
            "INSERT INTO user (id, username) VALUES (?1, ?2) RETURNING id",
            &[&username],
        )?
        .with_context(|| format!("Failed to create user {}", username))
    }

    fn insert_song(&self, song: &NewSong) -> Result<String> {
        self.insert_with_generated_id(
            &SONG_TABLE_V_0,
            "song",
            "INSERT INTO song (id, title, year, performer, genre, duration) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
            &[
                &song.title,
                &song.year,
                &song.performer,
                &song.genre,
                &song.duration,
            ],
        )?
        .with_context(|| format!("Failed to add song {}", song.title))
    }

    fn song_exists(&self, song_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE id = ?1", SONG_TABLE_V_0.name),
            params![song_id],
            |row| row.get::<usize, i64>(0),
        )?;
        Ok(count > 0)
    }

    fn get_playlist(&self, playlist_id: &str) -> Result<Option<Playlist>> {
        let conn = self.conn()?;
        let playlist = conn
            .query_row(
                &format!(
                    "SELECT id, name, owner FROM {} WHERE id = ?1",
                    PLAYLIST_TABLE_V_0.name
                ),
                params![playlist_id],
                |row| {
                    Ok(Playlist {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        owner_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(playlist)
    }

    fn insert_playlist(&self, name: &str, owner_id: &str) -> Result<Option<String>> {
        let playlist_id = self.insert_with_generated_id(
            &PLAYLIST_TABLE_V_0,
            "playlist",
            "INSERT INTO playlist (id, name, owner) VALUES (?1, ?2, ?3) RETURNING id",
            &[&name, &owner_id],
        )?;
        debug!("insert_playlist({name}) for {owner_id} -> {playlist_id:?}");
        Ok(playlist_id)
    }

    fn list_playlists_by_owner(&self, owner_id: &str) -> Result<Vec<PlaylistSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT p.id, p.name, u.username FROM {} p JOIN {} u ON u.id = p.owner \
             WHERE p.owner = ?1 ORDER BY p.created, p.rowid",
            PLAYLIST_TABLE_V_0.name, USER_TABLE_V_0.name
        ))?;
        let playlists = stmt
            .query_map(params![owner_id], |row| {
                Ok(PlaylistSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    username: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(playlists)
    }

    fn delete_playlist(&self, playlist_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", PLAYLIST_TABLE_V_0.name),
            params![playlist_id],
        )?;
        Ok(deleted)
    }

    fn insert_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<Option<String>> {
        self.insert_with_generated_id(
            &PLAYLIST_SONG_TABLE_V_0,
            "playlistsong",
            "INSERT INTO playlist_song (id, playlist_id, song_id) VALUES (?1, ?2, ?3) RETURNING id",
            &[&playlist_id, &song_id],
        )
    }

    fn list_playlist_songs(&self, playlist_id: &str) -> Result<Vec<PlaylistSong>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT s.id, s.title, s.performer FROM {} ps JOIN {} s ON s.id = ps.song_id \
             WHERE ps.playlist_id = ?1 ORDER BY ps.rowid",
            PLAYLIST_SONG_TABLE_V_0.name, SONG_TABLE_V_0.name
        ))?;
        let songs = stmt
            .query_map(params![playlist_id], |row| {
                Ok(PlaylistSong {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    performer: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    fn delete_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE playlist_id = ?1 AND song_id = ?2",
                PLAYLIST_SONG_TABLE_V_0.name
            ),
            params![playlist_id, song_id],
        )?;
        Ok(deleted)
    }
}
