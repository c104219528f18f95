//! SQLite-backed feed store
//!
//! Keeps the snapshot in two tables: a single-row `feed_cache` holding the
//! timestamp and `feed_image` holding the images in order. Every mutation runs
//! in one transaction.
//!
//! A file that is not a usable database does not prevent the store from
//! opening. Retrieval reports it as corrupt until a delete or insert replaces
//! it with a fresh database.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use url::Url;
use uuid::Uuid;

use super::queue::SerialQueue;
use super::store::{CachedFeed, FeedStore, LocalFeedImage, Pending, RetrievalOutcome, StoreError};

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) => {
                StoreError::CorruptData(err.to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

/// Database state owned by the store's worker thread
struct Database {
    /// `None` for an in-memory database
    path: Option<PathBuf>,
    /// `None` while the file at `path` is not a usable database
    conn: Option<Connection>,
}

impl Database {
    fn connect(path: Option<&Path>) -> Result<Connection, StoreError> {
        let conn = match path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        init_schema(&conn)?;
        Ok(conn)
    }

    fn connection(&mut self) -> Result<&mut Connection, StoreError> {
        self.conn
            .as_mut()
            .ok_or_else(|| StoreError::CorruptData("file is not a database".to_string()))
    }

    /// Discards the database file and starts over with an empty database
    fn recreate(&mut self) -> Result<&mut Connection, StoreError> {
        self.conn = None;
        if let Some(path) = &self.path {
            tracing::debug!(path = %path.display(), "Recreating SQLite feed store");
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        let conn = Self::connect(self.path.as_deref())?;
        Ok(self.conn.insert(conn))
    }

    /// The live connection, recreating the database if it is unusable
    fn writable_connection(&mut self) -> Result<&mut Connection, StoreError> {
        if self.conn.is_none() {
            return self.recreate();
        }
        self.connection()
    }

    fn delete(&mut self) -> Result<(), StoreError> {
        match delete_cache(self.writable_connection()?) {
            Err(StoreError::CorruptData(_)) => self.recreate().map(|_| ()),
            result => result,
        }
    }
}

/// Feed store persisting to an SQLite database
pub struct SqliteFeedStore {
    queue: SerialQueue<Database>,
}

impl SqliteFeedStore {
    /// Opens (or creates) the database at `path`
    ///
    /// # Returns
    /// * `Ok(SqliteFeedStore)` even if the existing file is not a database
    /// * `Err(StoreError::Unavailable)` if the file cannot be opened at all
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::debug!(path = %path.display(), "Opening SQLite feed store");
        let conn = match Database::connect(Some(path)) {
            Ok(conn) => Some(conn),
            Err(StoreError::CorruptData(reason)) => {
                tracing::warn!(path = %path.display(), error = %reason, "SQLite feed store is corrupt");
                None
            }
            Err(err) => return Err(err),
        };

        Self::with_database(Database {
            path: Some(path.to_path_buf()),
            conn,
        })
    }

    /// Opens a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_database(Database {
            path: None,
            conn: Some(Database::connect(None)?),
        })
    }

    fn with_database(database: Database) -> Result<Self, StoreError> {
        let queue = SerialQueue::spawn("sqlite-feed-store", database)?;
        Ok(Self { queue })
    }
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS feed_cache (
            id          INTEGER PRIMARY KEY CHECK (id = 1),
            timestamp   TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS feed_image (
            position    INTEGER PRIMARY KEY,
            id          TEXT NOT NULL,
            description TEXT,
            location    TEXT,
            url         TEXT NOT NULL
        );",
    )?;
    Ok(())
}

fn delete_cache(conn: &mut Connection) -> Result<(), StoreError> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM feed_image", [])?;
    tx.execute("DELETE FROM feed_cache", [])?;
    tx.commit()?;
    Ok(())
}

fn write_cache(
    conn: &mut Connection,
    feed: &[LocalFeedImage],
    timestamp: DateTime<Utc>,
) -> Result<(), StoreError> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM feed_image", [])?;
    tx.execute("DELETE FROM feed_cache", [])?;
    tx.execute(
        "INSERT INTO feed_cache (id, timestamp) VALUES (1, ?1)",
        params![timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)],
    )?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO feed_image (position, id, description, location, url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (position, image) in feed.iter().enumerate() {
            stmt.execute(params![
                position as i64,
                image.id.to_string(),
                image.description,
                image.location,
                image.url.as_str(),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn read_cache(conn: &Connection) -> Result<Option<CachedFeed>, StoreError> {
    let timestamp: Option<String> = conn
        .query_row("SELECT timestamp FROM feed_cache WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    let Some(timestamp) = timestamp else {
        return Ok(None);
    };
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|err| StoreError::CorruptData(format!("timestamp: {}", err)))?
        .with_timezone(&Utc);

    let mut stmt = conn.prepare(
        "SELECT id, description, location, url FROM feed_image ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut feed = Vec::new();
    for row in rows {
        let (id, description, location, url) = row?;
        feed.push(LocalFeedImage {
            id: Uuid::parse_str(&id)
                .map_err(|err| StoreError::CorruptData(format!("image id: {}", err)))?,
            description,
            location,
            url: Url::parse(&url)
                .map_err(|err| StoreError::CorruptData(format!("image url: {}", err)))?,
        });
    }

    Ok(Some(CachedFeed { feed, timestamp }))
}

impl FeedStore for SqliteFeedStore {
    fn delete_cached_feed(&self) -> Pending<Result<(), StoreError>> {
        let done = self.queue.submit(|db: &mut Database| {
            tracing::debug!("Deleting cached feed from SQLite");
            db.delete()
        });
        Box::pin(async move { done.await.and_then(|res| res) })
    }

    fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Pending<Result<(), StoreError>> {
        let done = self.queue.submit(move |db: &mut Database| {
            tracing::debug!(items = feed.len(), "Inserting cached feed into SQLite");
            write_cache(db.writable_connection()?, &feed, timestamp)
        });
        Box::pin(async move { done.await.and_then(|res| res) })
    }

    fn retrieve(&self) -> Pending<RetrievalOutcome> {
        let done = self.queue.submit(|db: &mut Database| {
            db.connection()
                .and_then(|conn| read_cache(conn))
                .inspect_err(|err| {
                    tracing::warn!(error = %err, "Failed to read cached feed from SQLite");
                })
        });
        Box::pin(async move { RetrievalOutcome::from(done.await.and_then(|res| res)) })
    }
}
