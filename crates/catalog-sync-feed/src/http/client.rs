use crate::error::TransportError;
use crate::traits::FeedClient;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("reelsync/", env!("CARGO_PKG_VERSION"));

pub fn create_feed_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Feed client backed by a shared reqwest connection pool
#[derive(Clone)]
pub struct HttpFeedClient {
    client: Arc<Client>,
}

impl HttpFeedClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(create_feed_client()),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for HttpFeedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch(&self, url: &Url) -> Result<String, TransportError> {
        debug!(operation = "feed_fetch", url = %url, "Requesting movie feed");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            // The response is dropped here, which hands the connection back to the pool
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| TransportError::Body {
            url: url.to_string(),
            source,
        })?;

        info!(
            operation = "feed_fetch",
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            "Fetched movie feed"
        );
        Ok(body)
    }
}
