use async_trait::async_trait;
use url::Url;
use crate::error::TransportError;

/// One-shot retrieval of the remote movie feed.
///
/// Implementations make a single attempt per call; retry policies belong to callers.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, TransportError>;
}
