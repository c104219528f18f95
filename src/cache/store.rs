//! Feed store abstraction
//!
//! A `FeedStore` is a single-slot persistent store holding at most one feed
//! snapshot. Backings are interchangeable: the local loader only ever talks to
//! this trait.

use std::io;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::data::FeedImage;

/// A store operation that has already been issued and will complete later
pub type Pending<T> = BoxFuture<'static, T>;

/// Errors reported by feed stores
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The underlying medium could not be read or written
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Stored bytes exist but do not decode into a snapshot
    #[error("Corrupt cache data: {0}")]
    CorruptData(String),

    /// The store's worker is no longer running
    #[error("Feed store worker has stopped")]
    Stopped,
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::CorruptData(err.to_string())
    }
}

/// Persisted representation of one feed image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFeedImage {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Url,
}

impl From<FeedImage> for LocalFeedImage {
    fn from(image: FeedImage) -> Self {
        Self {
            id: image.id,
            description: image.description,
            location: image.location,
            url: image.url,
        }
    }
}

impl From<LocalFeedImage> for FeedImage {
    fn from(image: LocalFeedImage) -> Self {
        Self {
            id: image.id,
            description: image.description,
            location: image.location,
            url: image.url,
        }
    }
}

/// The whole cache state: a feed and the instant it was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFeed {
    /// Images in insertion order
    pub feed: Vec<LocalFeedImage>,
    /// When the snapshot was written
    pub timestamp: DateTime<Utc>,
}

/// Result of reading a feed store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    /// Nothing has been written, or the snapshot was deleted
    Empty,
    /// A complete snapshot
    Found(CachedFeed),
    /// The store could not be read or decoded
    Failure(StoreError),
}

impl From<Result<Option<CachedFeed>, StoreError>> for RetrievalOutcome {
    fn from(result: Result<Option<CachedFeed>, StoreError>) -> Self {
        match result {
            Ok(Some(cache)) => RetrievalOutcome::Found(cache),
            Ok(None) => RetrievalOutcome::Empty,
            Err(err) => RetrievalOutcome::Failure(err),
        }
    }
}

/// Single-slot persistent store for the cached feed
///
/// Every method issues its operation at call time and returns a future for
/// its completion. Operations against one store instance run one at a time
/// and complete in the order they were issued, whatever their kind.
pub trait FeedStore: Send + Sync {
    /// Removes the cached feed. Succeeds when there is nothing to remove.
    fn delete_cached_feed(&self) -> Pending<Result<(), StoreError>>;

    /// Replaces the cached feed with `feed` written at `timestamp`
    ///
    /// On failure the previous snapshot (or nothing) stays readable, never a
    /// partial one.
    fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Pending<Result<(), StoreError>>;

    /// Reads the cached feed without modifying it
    fn retrieve(&self) -> Pending<RetrievalOutcome>;
}
