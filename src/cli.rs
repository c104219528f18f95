//! Command-line interface parsing for feedcache
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated `Config`, including resolving the default store location in the
//! platform cache directory.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use directories::ProjectDirs;
use thiserror::Error;
use url::Url;

use crate::cache::{FeedStore, InMemoryFeedStore, JsonFeedStore, StoreError};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The feed URL could not be parsed
    #[error("Invalid feed URL: '{0}'")]
    InvalidUrl(String),

    /// No --store was given and no cache directory could be determined
    #[error("Could not determine a cache directory; pass --store <PATH>")]
    NoStorePath,
}

/// Where the cached feed is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// A single JSON file
    Json,
    /// An SQLite database
    Sqlite,
    /// Process memory only; nothing is persisted
    Memory,
}

impl StoreBackend {
    /// File name used for this backend inside the cache directory
    fn default_file_name(self) -> &'static str {
        match self {
            StoreBackend::Json | StoreBackend::Memory => "feed-store.json",
            StoreBackend::Sqlite => "feed-store.sqlite",
        }
    }
}

/// feedcache - Fetch an image feed and keep a validated local copy
#[derive(Parser, Debug)]
#[command(name = "feedcache")]
#[command(about = "Fetch an image feed and keep a validated local cache")]
#[command(version)]
pub struct Cli {
    /// Path of the feed store (defaults to the platform cache directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Storage backend for the cached feed
    #[arg(long, global = true, value_enum, default_value_t = StoreBackend::Json)]
    pub backend: StoreBackend,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the remote feed and replace the cached copy
    Refresh {
        /// URL of the feed to fetch
        #[arg(long, value_name = "URL")]
        url: String,
    },
    /// Print the cached feed (empty when missing or expired)
    Show {
        /// Print the feed as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evict the cached feed if it is expired or unreadable
    Validate,
}

/// What the binary should do once configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Refresh(Url),
    Show { json: bool },
    Validate,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where the store lives on disk
    pub store_path: PathBuf,
    /// Which store backing to use
    pub backend: StoreBackend,
    /// The requested action
    pub action: Action,
}

/// Returns the default store path for `backend`
///
/// Uses `~/.cache/feedcache/` on Linux, or the equivalent platform cache
/// directory elsewhere. Returns `None` if no home directory can be found.
pub fn default_store_path(backend: StoreBackend) -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "feedcache")?;
    Some(project_dirs.cache_dir().join(backend.default_file_name()))
}

/// Parses a feed URL argument.
///
/// # Returns
/// * `Ok(Url)` if the string is an absolute URL
/// * `Err(CliError::InvalidUrl)` otherwise
pub fn parse_url_arg(s: &str) -> Result<Url, CliError> {
    Url::parse(s).map_err(|_| CliError::InvalidUrl(s.to_string()))
}

impl Config {
    /// Creates a Config from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(Config)` with the store path resolved
    /// * `Err(CliError)` if the URL is invalid or no store path can be found
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let action = match &cli.command {
            Command::Refresh { url } => Action::Refresh(parse_url_arg(url)?),
            Command::Show { json } => Action::Show { json: *json },
            Command::Validate => Action::Validate,
        };

        let store_path = match &cli.store {
            Some(path) => path.clone(),
            None => default_store_path(cli.backend).ok_or(CliError::NoStorePath)?,
        };

        Ok(Config {
            store_path,
            backend: cli.backend,
            action,
        })
    }

    /// Opens the configured store backing
    pub fn open_store(&self) -> Result<Arc<dyn FeedStore>, StoreError> {
        let store: Arc<dyn FeedStore> = match self.backend {
            StoreBackend::Json => Arc::new(JsonFeedStore::new(self.store_path.clone())?),
            #[cfg(feature = "sqlite")]
            StoreBackend::Sqlite => Arc::new(crate::cache::SqliteFeedStore::open(&self.store_path)?),
            #[cfg(not(feature = "sqlite"))]
            StoreBackend::Sqlite => {
                return Err(StoreError::Unavailable(
                    "feedcache was built without SQLite support".to_string(),
                ))
            }
            StoreBackend::Memory => Arc::new(InMemoryFeedStore::new()?),
        };
        Ok(store)
    }
}
