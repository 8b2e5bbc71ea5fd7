//! Remote feed gateway abstraction
//!
//! The reconcilers only talk to put.io through [`FeedGateway`], which keeps
//! "not found" distinguishable from every other failure.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::crd::FeedSpec;

use super::remote_feed::RemoteFeed;

/// Result type for gateway calls
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Failures reported by the remote gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The addressed feed does not exist (HTTP 404 or `NotFound` error type)
    #[error("put.io resource not found: {0}")]
    NotFound(String),

    /// The call succeeded at the transport level but the payload status was not "OK"
    #[error("put.io: invalid \"{0}\" status received")]
    Status(String),

    /// Non-success HTTP response
    #[error("put.io returned HTTP {status}: {message}")]
    Api {
        status: u16,
        error_type: Option<String>,
        message: String,
    },

    /// Network or TLS failure
    #[error("request to put.io failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be understood
    #[error("unexpected put.io response: {0}")]
    Decode(String),

    /// Token cannot be used as a bearer credential
    #[error("invalid put.io credentials: {0}")]
    Credentials(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }
}

/// Form payload for feed create/update calls
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FeedFields {
    pub title: String,
    pub rss_source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_dir_id: Option<u64>,
    pub delete_old_files: bool,
    pub dont_process_whole_feed: bool,
    pub keyword: String,
    pub unwanted_keywords: String,
    /// Only sent on create; pause state is otherwise a separate action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
}

impl FeedFields {
    /// Build the payload for `spec` with an already encoded remote title
    pub fn from_spec(spec: &FeedSpec, title: String) -> Self {
        Self {
            title,
            rss_source_url: spec.rss_source_url.clone(),
            parent_dir_id: spec.parent_dir_id,
            delete_old_files: spec.delete_old_files,
            dont_process_whole_feed: spec.dont_process_whole_feed,
            keyword: spec.keyword.clone(),
            unwanted_keywords: spec.unwanted_keywords.clone().unwrap_or_default(),
            paused: None,
        }
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = Some(paused);
        self
    }
}

/// Typed access to the put.io RSS management API
#[async_trait]
pub trait FeedGateway: Send + Sync {
    async fn list(&self) -> GatewayResult<Vec<RemoteFeed>>;

    async fn get(&self, id: u64) -> GatewayResult<RemoteFeed>;

    async fn create(&self, fields: &FeedFields) -> GatewayResult<RemoteFeed>;

    async fn update(&self, fields: &FeedFields, id: u64) -> GatewayResult<()>;

    async fn delete(&self, id: u64) -> GatewayResult<()>;

    async fn pause(&self, id: u64) -> GatewayResult<()>;

    async fn resume(&self, id: u64) -> GatewayResult<()>;
}

/// Builds an authenticated gateway from a resolved token
pub trait GatewayConnector: Send + Sync {
    type Gateway: FeedGateway;

    fn connect(&self, token: &str) -> GatewayResult<Self::Gateway>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::AuthSecretRef;

    fn spec() -> FeedSpec {
        FeedSpec {
            title: "foo".to_string(),
            rss_source_url: "https://www.google.com".to_string(),
            parent_dir_id: Some(1234),
            delete_old_files: true,
            dont_process_whole_feed: true,
            keyword: "foo".to_string(),
            unwanted_keywords: Some("bar".to_string()),
            paused: true,
            auth_secret_ref: AuthSecretRef {
                name: "putio".to_string(),
                key: "token".to_string(),
            },
        }
    }

    #[test]
    fn test_fields_from_spec_leave_pause_out() {
        let fields = FeedFields::from_spec(&spec(), "foo|0|managed by X".to_string());

        assert_eq!(fields.title, "foo|0|managed by X");
        assert_eq!(fields.parent_dir_id, Some(1234));
        assert_eq!(fields.unwanted_keywords, "bar");
        assert!(fields.delete_old_files);
        assert!(fields.dont_process_whole_feed);
        assert_eq!(fields.paused, None);
    }

    #[test]
    fn test_missing_unwanted_keywords_sent_empty() {
        let mut spec = spec();
        spec.unwanted_keywords = None;
        let fields = FeedFields::from_spec(&spec, "t".to_string()).with_paused(false);

        assert_eq!(fields.unwanted_keywords, "");
        assert_eq!(fields.paused, Some(false));
    }

    #[test]
    fn test_only_not_found_is_not_found() {
        assert!(GatewayError::NotFound("/v2/rss/1".to_string()).is_not_found());
        assert!(!GatewayError::Status("ERROR".to_string()).is_not_found());
        assert!(!GatewayError::Api {
            status: 500,
            error_type: None,
            message: "boom".to_string()
        }
        .is_not_found());
    }
}
