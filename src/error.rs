//! Crate-wide error type shared by every `FeedLoader`

use thiserror::Error;

use crate::cache::StoreError;
use crate::data::RemoteFeedError;

/// Errors a feed loader can report
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The local feed store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The remote feed could not be loaded
    #[error(transparent)]
    Remote(#[from] RemoteFeedError),
}

/// Result type for feed loading.
pub type Result<T> = std::result::Result<T, Error>;
