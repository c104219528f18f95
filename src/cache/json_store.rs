//! File-backed feed store
//!
//! Persists the snapshot as a single JSON file. Writes go to a uniquely named
//! temporary file in the same directory that is then renamed over the target,
//! so a reader sees either the old snapshot or the new one, even with several
//! stores sharing one path.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use super::queue::SerialQueue;
use super::store::{CachedFeed, FeedStore, LocalFeedImage, Pending, RetrievalOutcome, StoreError};

/// Feed store persisting to a JSON file
pub struct JsonFeedStore {
    queue: SerialQueue<PathBuf>,
}

impl JsonFeedStore {
    /// Creates a store persisting to `store_path`
    ///
    /// The file and its parent directories are created on the first insert.
    pub fn new(store_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let queue = SerialQueue::spawn("json-feed-store", store_path.into())?;
        Ok(Self { queue })
    }
}

fn read_cache(path: &Path) -> Result<Option<CachedFeed>, StoreError> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let cache = serde_json::from_slice::<CachedFeed>(&content).inspect_err(|err| {
        tracing::warn!(path = %path.display(), error = %err, "Cached feed is corrupt");
    })?;

    Ok(Some(cache))
}

fn write_cache(path: &Path, cache: &CachedFeed) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let json = serde_json::to_vec(cache)?;
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(&json)?;
    // A failed persist hands the temporary file back and drops it, removing it.
    staged.persist(path).map_err(|err| err.error)?;

    Ok(())
}

fn delete_cache(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

impl FeedStore for JsonFeedStore {
    fn delete_cached_feed(&self) -> Pending<Result<(), StoreError>> {
        let done = self.queue.submit(|path: &mut PathBuf| {
            tracing::debug!(path = %path.display(), "Deleting cached feed");
            delete_cache(path)
        });
        Box::pin(async move { done.await.and_then(|res| res) })
    }

    fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Pending<Result<(), StoreError>> {
        let done = self.queue.submit(move |path: &mut PathBuf| {
            tracing::debug!(path = %path.display(), items = feed.len(), "Inserting cached feed");
            write_cache(path, &CachedFeed { feed, timestamp })
        });
        Box::pin(async move { done.await.and_then(|res| res) })
    }

    fn retrieve(&self) -> Pending<RetrievalOutcome> {
        let done = self.queue.submit(|path: &mut PathBuf| read_cache(path));
        Box::pin(async move { RetrievalOutcome::from(done.await.and_then(|res| res)) })
    }
}
