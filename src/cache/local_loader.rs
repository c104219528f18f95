//! Local feed loader
//!
//! Ties a `FeedStore` to the cache policy and an injected clock to save,
//! load and validate the cached feed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::policy::FeedCachePolicy;
use super::store::{FeedStore, LocalFeedImage, RetrievalOutcome, StoreError};
use crate::data::{FeedImage, FeedLoader};

/// Clock used to timestamp and validate snapshots
type CurrentDate = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Saves, loads and validates the cached feed
///
/// Holds no state of its own besides the store handle and the clock. The
/// futures returned by its methods borrow the loader, so it cannot be released
/// while an operation is in flight; dropping the operation's future instead
/// discards whatever the store reports afterwards and stops any follow-up
/// store call from being issued.
pub struct LocalFeedLoader {
    store: Arc<dyn FeedStore>,
    current_date: CurrentDate,
}

impl LocalFeedLoader {
    /// Creates a loader over `store` using `current_date` as its clock
    pub fn new(
        store: Arc<dyn FeedStore>,
        current_date: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            current_date: Box::new(current_date),
        }
    }

    /// Replaces the cached feed with `feed`, timestamped with the current date
    ///
    /// The old snapshot is deleted first. If deletion fails its error is
    /// returned and nothing is inserted.
    pub async fn save(&self, feed: &[FeedImage]) -> Result<(), StoreError> {
        self.store.delete_cached_feed().await?;
        self.cache(feed).await
    }

    async fn cache(&self, feed: &[FeedImage]) -> Result<(), StoreError> {
        let local = feed.iter().cloned().map(LocalFeedImage::from).collect();
        self.store.insert(local, (self.current_date)()).await
    }

    /// Loads the cached feed
    ///
    /// # Returns
    /// * `Ok(feed)` if a snapshot is present and still valid
    /// * `Ok(vec![])` if the store is empty or the snapshot expired
    /// * `Err(StoreError)` if the store could not be read
    ///
    /// Never modifies the store; expired snapshots are left for
    /// `validate_cache` to evict.
    pub async fn load(&self) -> Result<Vec<FeedImage>, StoreError> {
        match self.store.retrieve().await {
            RetrievalOutcome::Failure(err) => Err(err),
            RetrievalOutcome::Found(cache)
                if FeedCachePolicy::validate(cache.timestamp, (self.current_date)()) =>
            {
                Ok(cache.feed.into_iter().map(FeedImage::from).collect())
            }
            RetrievalOutcome::Found(_) | RetrievalOutcome::Empty => Ok(Vec::new()),
        }
    }

    /// Deletes the cached feed if it is expired or cannot be read
    ///
    /// Deletion errors are ignored.
    pub async fn validate_cache(&self) {
        let evict = match self.store.retrieve().await {
            RetrievalOutcome::Failure(_) => true,
            RetrievalOutcome::Found(cache) => {
                !FeedCachePolicy::validate(cache.timestamp, (self.current_date)())
            }
            RetrievalOutcome::Empty => false,
        };

        if evict {
            let _ = self.store.delete_cached_feed().await;
        }
    }
}

#[async_trait]
impl FeedLoader for LocalFeedLoader {
    async fn load(&self) -> crate::error::Result<Vec<FeedImage>> {
        Ok(LocalFeedLoader::load(self).await?)
    }
}
