//! In-memory feed store
//!
//! Keeps the snapshot on the store's worker thread. Nothing survives the
//! process, which makes it handy for ephemeral runs and tests.

use chrono::{DateTime, Utc};

use super::queue::SerialQueue;
use super::store::{CachedFeed, FeedStore, LocalFeedImage, Pending, RetrievalOutcome, StoreError};

/// Feed store holding the snapshot in memory
pub struct InMemoryFeedStore {
    queue: SerialQueue<Option<CachedFeed>>,
}

impl InMemoryFeedStore {
    /// Creates an empty store
    pub fn new() -> Result<Self, StoreError> {
        let queue = SerialQueue::spawn("memory-feed-store", None)?;
        Ok(Self { queue })
    }
}

impl FeedStore for InMemoryFeedStore {
    fn delete_cached_feed(&self) -> Pending<Result<(), StoreError>> {
        self.queue.submit(|cache: &mut Option<CachedFeed>| {
            *cache = None;
        })
    }

    fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Pending<Result<(), StoreError>> {
        self.queue.submit(move |cache: &mut Option<CachedFeed>| {
            *cache = Some(CachedFeed { feed, timestamp });
        })
    }

    fn retrieve(&self) -> Pending<RetrievalOutcome> {
        let done = self.queue.submit(|cache: &mut Option<CachedFeed>| cache.clone());
        Box::pin(async move { RetrievalOutcome::from(done.await) })
    }
}
