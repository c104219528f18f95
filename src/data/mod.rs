//! Core feed models
//!
//! This module contains the caller-facing feed image type and the `FeedLoader`
//! trait implemented by both the remote and the local (cached) loaders.

pub mod remote;

pub use remote::{
    FeedItemsMapper, HttpClient, HttpClientError, HttpResponse, RemoteFeedError, RemoteFeedLoader,
    ReqwestHttpClient,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::Result;

/// A single image in the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedImage {
    /// Unique identifier of the image
    pub id: Uuid,
    /// Optional caption
    pub description: Option<String>,
    /// Optional place name where the image was taken
    pub location: Option<String>,
    /// Where the image itself can be downloaded from
    pub url: Url,
}

/// Anything that can produce the current feed
#[async_trait]
pub trait FeedLoader: Send + Sync {
    /// Loads the feed, in display order
    async fn load(&self) -> Result<Vec<FeedImage>>;
}
