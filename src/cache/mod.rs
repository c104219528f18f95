//! Local feed cache
//!
//! This module provides the single-slot `FeedStore` abstraction, the store
//! backings shipped with the crate, the 7-day validity policy and the
//! `LocalFeedLoader` that saves, loads and validates the cached feed on top of
//! them. Every bundled store serializes its operations on a worker thread so
//! they complete in the order they were issued.

mod json_store;
mod local_loader;
mod memory_store;
mod policy;
mod queue;
#[cfg(feature = "sqlite")]
mod sqlite_store;
mod store;

pub use json_store::JsonFeedStore;
pub use local_loader::LocalFeedLoader;
pub use memory_store::InMemoryFeedStore;
pub use policy::FeedCachePolicy;
#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteFeedStore;
pub use store::{CachedFeed, FeedStore, LocalFeedImage, Pending, RetrievalOutcome, StoreError};
