//! Remote feed API client
//!
//! Fetches the image feed over HTTP and maps the JSON payload into `FeedImage`s.
//! Transport is delegated to an `HttpClient` so the loader can be exercised
//! without a network.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use super::{FeedImage, FeedLoader};

/// The only status code accepted as a valid feed response
const OK_200: u16 = 200;

/// Errors that can occur when loading the remote feed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteFeedError {
    /// The HTTP request could not be completed
    #[error("Could not reach the feed server")]
    Connectivity,

    /// The server answered with something that is not a feed
    #[error("Feed response was invalid")]
    InvalidData,
}

/// Errors raised by an `HttpClient`
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// A raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body bytes
    pub body: Vec<u8>,
}

/// Minimal HTTP capability needed by the remote loader
///
/// Implementations may complete on any thread.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Performs a GET request against `url`
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError>;
}

/// `HttpClient` backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new client with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new client wrapping a preconfigured `reqwest::Client`
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

/// Feed payload as served by the API
#[derive(Debug, Deserialize)]
struct Root {
    items: Vec<RemoteFeedItem>,
}

/// A single feed item as served by the API
#[derive(Debug, Deserialize)]
struct RemoteFeedItem {
    id: Uuid,
    description: Option<String>,
    location: Option<String>,
    #[serde(rename = "image")]
    image_url: Url,
}

impl From<RemoteFeedItem> for FeedImage {
    fn from(item: RemoteFeedItem) -> Self {
        Self {
            id: item.id,
            description: item.description,
            location: item.location,
            url: item.image_url,
        }
    }
}

/// Maps HTTP responses into feed images
pub struct FeedItemsMapper;

impl FeedItemsMapper {
    /// Maps a response body and status code into feed images
    ///
    /// # Returns
    /// * `Ok(Vec<FeedImage>)` for a 200 response with a well-formed `items` list
    /// * `Err(RemoteFeedError::InvalidData)` for any other status or payload
    pub fn map(body: &[u8], status: u16) -> Result<Vec<FeedImage>, RemoteFeedError> {
        if status != OK_200 {
            return Err(RemoteFeedError::InvalidData);
        }

        let root: Root = serde_json::from_slice(body).map_err(|_| RemoteFeedError::InvalidData)?;
        Ok(root.items.into_iter().map(FeedImage::from).collect())
    }
}

/// Loads the feed from a remote URL
pub struct RemoteFeedLoader<C> {
    url: Url,
    client: C,
}

impl<C: HttpClient> RemoteFeedLoader<C> {
    /// Creates a loader fetching `url` through `client`
    pub fn new(url: Url, client: C) -> Self {
        Self { url, client }
    }

    /// Fetches and maps the feed
    ///
    /// # Returns
    /// * `Ok(Vec<FeedImage>)` - The feed in server order
    /// * `Err(RemoteFeedError::Connectivity)` - If the request failed
    /// * `Err(RemoteFeedError::InvalidData)` - If the response is not a feed
    pub async fn load(&self) -> Result<Vec<FeedImage>, RemoteFeedError> {
        tracing::debug!(url = %self.url, "Fetching remote feed");

        let response = self.client.get(&self.url).await.map_err(|err| {
            tracing::warn!(url = %self.url, error = %err, "Remote feed request failed");
            RemoteFeedError::Connectivity
        })?;

        FeedItemsMapper::map(&response.body, response.status).inspect_err(|_| {
            tracing::warn!(
                url = %self.url,
                status = response.status,
                "Remote feed response was invalid"
            );
        })
    }
}

#[async_trait]
impl<C: HttpClient> FeedLoader for RemoteFeedLoader<C> {
    async fn load(&self) -> crate::error::Result<Vec<FeedImage>> {
        Ok(RemoteFeedLoader::load(self).await?)
    }
}
