use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pezzottify_playlists::cache::{create_cache_backend, CacheLayer};
use pezzottify_playlists::config::{AppConfig, CacheBackendKind, CliConfig, FileConfig};
use pezzottify_playlists::export::{AmqpPublisher, ExportDispatcher, QueuePublisher};
use pezzottify_playlists::metrics;
use pezzottify_playlists::playlist::{
    NewSong, OwnershipGate, PlaylistRepository, PlaylistService, SqlitePlaylistStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the flags below.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite playlists database file.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Backend of the playlist songs cache.
    #[clap(long, value_enum, default_value_t = CacheBackendKind::Memory)]
    pub cache_backend: CacheBackendKind,

    /// Redis URL, required by the redis cache backend.
    #[clap(long)]
    pub redis_url: Option<String>,

    /// TTL of cached playlist song listings in seconds. 0 disables expiry.
    #[clap(long, default_value_t = pezzottify_playlists::config::DEFAULT_CACHE_TTL_SEC)]
    pub cache_ttl_sec: u64,

    /// AMQP URL of the message broker used for exports.
    #[clap(long)]
    pub amqp_url: Option<String>,

    /// Name of the durable export queue.
    #[clap(long, default_value = pezzottify_playlists::config::DEFAULT_EXPORT_QUEUE)]
    pub export_queue: String,

    /// How long to wait for the broker to confirm a published export job.
    #[clap(long, default_value_t = pezzottify_playlists::config::DEFAULT_CONFIRM_TIMEOUT_MS)]
    pub confirm_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            cache_backend: self.cache_backend,
            redis_url: self.redis_url.clone(),
            cache_ttl_sec: self.cache_ttl_sec,
            amqp_url: self.amqp_url.clone(),
            export_queue: self.export_queue.clone(),
            confirm_timeout_ms: self.confirm_timeout_ms,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates a user with the given username and prints its id.
    AddUser { username: String },

    /// Adds a song to the catalog and prints its id.
    AddSong {
        title: String,
        year: u32,
        performer: String,
        #[clap(long)]
        genre: Option<String>,
        /// Duration in seconds.
        #[clap(long)]
        duration: Option<u32>,
    },

    /// Creates a playlist owned by the given user and prints its id.
    CreatePlaylist { owner_id: String, name: String },

    /// Shows the playlists owned by a user.
    ListPlaylists { owner_id: String },

    /// Deletes a playlist, the caller must own it.
    DeletePlaylist {
        playlist_id: String,
        caller_id: String,
    },

    /// Adds a catalog song to a playlist, the caller must own it.
    AddSongToPlaylist {
        playlist_id: String,
        song_id: String,
        caller_id: String,
    },

    /// Removes every entry of a song from a playlist, the caller must own it.
    RemoveSongFromPlaylist {
        playlist_id: String,
        song_id: String,
        caller_id: String,
    },

    /// Shows the songs of a playlist, the caller must own it.
    ListSongs {
        playlist_id: String,
        caller_id: String,
    },

    /// Enqueues an export of a playlist to the given email address.
    Export {
        playlist_id: String,
        caller_id: String,
        target_email: String,
    },

    /// Prints the metrics collected while running the command.
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(DEFAULT_LOG_LEVEL.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    metrics::init_metrics();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening SQLite playlists database at {:?}...", config.db_path);
    let repository: Arc<dyn PlaylistRepository> =
        Arc::new(SqlitePlaylistStore::new(&config.db_path)?);
    let gate = OwnershipGate::new(repository.clone());

    info!("Using {:?} cache backend", config.cache.backend);
    let cache = CacheLayer::new(create_cache_backend(&config.cache)?);
    let service = PlaylistService::new(repository.clone(), gate.clone(), cache, config.cache.ttl);

    match cli_args.command {
        Command::AddUser { username } => {
            println!("{}", repository.insert_user(&username)?);
        }
        Command::AddSong {
            title,
            year,
            performer,
            genre,
            duration,
        } => {
            let song = NewSong {
                genre,
                duration,
                ..NewSong::new(title, year, performer)
            };
            println!("{}", repository.insert_song(&song)?);
        }
        Command::CreatePlaylist { owner_id, name } => {
            println!("{}", service.add_playlist(&name, &owner_id)?);
        }
        Command::ListPlaylists { owner_id } => {
            let playlists = service.list_playlists_by_owner(&owner_id)?;
            if playlists.is_empty() {
                println!("No playlists.");
            }
            for playlist in playlists {
                println!("{}\t{}\t{}", playlist.id, playlist.name, playlist.username);
            }
        }
        Command::DeletePlaylist {
            playlist_id,
            caller_id,
        } => {
            service.delete_playlist(&playlist_id, &caller_id).await?;
            println!("Deleted {}", playlist_id);
        }
        Command::AddSongToPlaylist {
            playlist_id,
            song_id,
            caller_id,
        } => {
            let entry_id = service
                .add_song_to_playlist(&playlist_id, &song_id, &caller_id)
                .await?;
            println!("{}", entry_id);
        }
        Command::RemoveSongFromPlaylist {
            playlist_id,
            song_id,
            caller_id,
        } => {
            service
                .remove_song_from_playlist(&playlist_id, &song_id, &caller_id)
                .await?;
            println!("Removed {} from {}", song_id, playlist_id);
        }
        Command::ListSongs {
            playlist_id,
            caller_id,
        } => {
            for song in service.get_playlist_songs(&playlist_id, &caller_id).await? {
                println!("{}\t{}\t{}", song.id, song.title, song.performer);
            }
        }
        Command::Export {
            playlist_id,
            caller_id,
            target_email,
        } => {
            let Some(amqp_url) = config.broker.amqp_url.as_deref() else {
                bail!("Exports need a broker, set --amqp-url or broker.amqp_url");
            };
            let publisher: Arc<dyn QueuePublisher> =
                Arc::new(AmqpPublisher::new(amqp_url, config.broker.confirm_timeout));
            let dispatcher = ExportDispatcher::new(gate, publisher, config.broker.export_queue);
            dispatcher
                .request_export(&playlist_id, &caller_id, &target_email)
                .await?;
            println!("Export of {} enqueued", playlist_id);
        }
        Command::Metrics => {
            print!("{}", metrics::gather());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_at_info_unless_overridden() {
        assert_eq!(DEFAULT_LOG_LEVEL, LevelFilter::INFO);
    }

    #[test]
    fn cli_defaults_cache_listings_with_ttl() {
        let args = CliArgs::parse_from(["playlist-admin", "--db-path", "/tmp/p.db", "metrics"]);
        assert_eq!(
            args.cache_ttl_sec,
            pezzottify_playlists::config::DEFAULT_CACHE_TTL_SEC
        );
        let config = AppConfig::resolve(&args.to_cli_config(), None).unwrap();
        assert!(config.cache.ttl.is_some());
    }
}
