//! put.io RSS API client
//!
//! Implements [`FeedGateway`] over `reqwest`. Mutating calls are form-encoded,
//! every request carries the bearer token of the Feed's auth secret.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::gateway::{FeedFields, FeedGateway, GatewayConnector, GatewayError, GatewayResult};
use super::remote_feed::RemoteFeed;

/// Default put.io API endpoint
pub const DEFAULT_API_URL: &str = "https://api.put.io";

/// put.io error type reported for missing resources
const NOT_FOUND_ERROR_TYPE: &str = "NotFound";

/// Payload status for successful actions
const STATUS_OK: &str = "OK";

#[derive(Deserialize)]
struct FeedEnvelope {
    feed: RemoteFeed,
}

#[derive(Deserialize)]
struct FeedListEnvelope {
    #[serde(default)]
    feeds: Vec<RemoteFeed>,
}

#[derive(Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    status: String,
}

#[derive(Deserialize, Default)]
struct ErrorEnvelope {
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Authenticated put.io client
#[derive(Clone, Debug)]
pub struct PutioClient {
    http: reqwest::Client,
    base_url: String,
}

impl PutioClient {
    /// Create a client for `base_url` authenticating with `token`
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> GatewayResult<Self> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|e| GatewayError::Credentials(e.to_string()))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("putio-feed-operator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the raw body of a successful response
    async fn execute(&self, request: RequestBuilder, path: &str) -> GatewayResult<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(path = %path, status = status.as_u16(), "put.io responded");

        if status.is_success() {
            return Ok(body.to_vec());
        }

        let error: ErrorEnvelope = serde_json::from_slice(&body).unwrap_or_default();
        if status == StatusCode::NOT_FOUND
            || error.error_type.as_deref() == Some(NOT_FOUND_ERROR_TYPE)
        {
            return Err(GatewayError::NotFound(path.to_string()));
        }

        Err(GatewayError::Api {
            status: status.as_u16(),
            message: error
                .error_message
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned()),
            error_type: error.error_type,
        })
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> GatewayResult<T> {
        let body = self.execute(request, path).await?;
        serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(format!("{}: {}", path, e)))
    }

    /// Actions answering `{"status": "..."}` must report "OK"
    async fn execute_action(&self, request: RequestBuilder, path: &str) -> GatewayResult<()> {
        let envelope: StatusEnvelope = self.execute_json(request, path).await?;
        if envelope.status != STATUS_OK {
            return Err(GatewayError::Status(envelope.status));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedGateway for PutioClient {
    #[instrument(skip(self))]
    async fn list(&self) -> GatewayResult<Vec<RemoteFeed>> {
        let path = "/v2/rss/list";
        let envelope: FeedListEnvelope = self.execute_json(self.http.get(self.url(path)), path).await?;
        Ok(envelope.feeds)
    }

    #[instrument(skip(self), fields(feed.id = id))]
    async fn get(&self, id: u64) -> GatewayResult<RemoteFeed> {
        let path = format!("/v2/rss/{}", id);
        let envelope: FeedEnvelope = self.execute_json(self.http.get(self.url(&path)), &path).await?;
        Ok(envelope.feed)
    }

    #[instrument(skip(self, feed), fields(title = %feed.title))]
    async fn create(&self, feed: &FeedFields) -> GatewayResult<RemoteFeed> {
        let path = "/v2/rss/create";
        let request = self.http.post(self.url(path)).form(feed);
        let envelope: FeedEnvelope = self.execute_json(request, path).await?;
        Ok(envelope.feed)
    }

    #[instrument(skip(self, feed), fields(feed.id = id))]
    async fn update(&self, feed: &FeedFields, id: u64) -> GatewayResult<()> {
        let path = format!("/v2/rss/{}", id);
        let request = self.http.post(self.url(&path)).form(feed);
        self.execute_action(request, &path).await
    }

    #[instrument(skip(self), fields(feed.id = id))]
    async fn delete(&self, id: u64) -> GatewayResult<()> {
        let path = format!("/v2/rss/{}/delete", id);
        self.execute(self.http.post(self.url(&path)), &path).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(feed.id = id))]
    async fn pause(&self, id: u64) -> GatewayResult<()> {
        let path = format!("/v2/rss/{}/pause", id);
        self.execute_action(self.http.post(self.url(&path)), &path).await
    }

    #[instrument(skip(self), fields(feed.id = id))]
    async fn resume(&self, id: u64) -> GatewayResult<()> {
        let path = format!("/v2/rss/{}/resume", id);
        self.execute_action(self.http.post(self.url(&path)), &path).await
    }
}

/// Creates [`PutioClient`]s for tokens read from Feed auth secrets
#[derive(Clone, Debug)]
pub struct PutioConnector {
    base_url: String,
    timeout: Duration,
}

impl PutioConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl GatewayConnector for PutioConnector {
    type Gateway = PutioClient;

    fn connect(&self, token: &str) -> GatewayResult<PutioClient> {
        PutioClient::new(&self.base_url, token, self.timeout)
    }
}
