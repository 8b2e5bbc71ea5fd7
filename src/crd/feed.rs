//! Feed Custom Resource Definition

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parent directory used when none is given (put.io root folder)
pub const DEFAULT_PARENT_DIR_ID: u64 = 0;

/// Feed resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "putio.skynewz.dev",
    version = "v1alpha1",
    kind = "Feed",
    plural = "feeds",
    singular = "feed",
    namespaced,
    status = "FeedStatus",
    printcolumn = r#"{"name": "Keyword", "type": "string", "jsonPath": ".spec.keyword"}"#,
    printcolumn = r#"{"name": "Last fetch", "type": "date", "jsonPath": ".status.lastFetch"}"#,
    printcolumn = r#"{"name": "Paused", "type": "boolean", "jsonPath": ".spec.paused"}"#,
    printcolumn = r#"{"name": "Title", "type": "string", "jsonPath": ".spec.title"}"#,
    printcolumn = r#"{"name": "URL", "type": "string", "priority": 1, "jsonPath": ".spec.rssSourceUrl"}"#,
    printcolumn = r#"{"name": "ID", "type": "string", "priority": 1, "jsonPath": ".status.id"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct FeedSpec {
    /// Title of the RSS feed as it will appear on put.io
    pub title: String,

    /// URL of the RSS feed to be watched
    pub rss_source_url: String,

    /// File ID of the folder to place the RSS feed files in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_dir_id: Option<u64>,

    /// Delete old files in the folder when space is low
    #[serde(default)]
    pub delete_old_files: bool,

    /// Ignore the items already in the feed at creation time
    #[serde(default)]
    pub dont_process_whole_feed: bool,

    /// Only items whose titles contain any of these words are transferred (comma-separated)
    pub keyword: String,

    /// Items whose titles contain any of these words are never transferred (comma-separated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unwanted_keywords: Option<String>,

    /// Keep the RSS feed paused on put.io
    #[serde(default)]
    pub paused: bool,

    /// Secret holding the put.io OAuth token
    pub auth_secret_ref: AuthSecretRef,
}

/// Reference to a key of a Secret holding a put.io token
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthSecretRef {
    /// Secret name
    pub name: String,
    /// Key within the secret
    pub key: String,
}

/// Feed status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    /// put.io feed ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Last error reported by put.io while fetching the feed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// Last time put.io fetched the feed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fetch: Option<DateTime<Utc>>,

    /// Number of items put.io failed to transfer
    #[serde(default)]
    pub failed_item_count: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Generation last synchronized to put.io
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Status conditions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// Status condition
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type
    #[serde(rename = "type")]
    pub type_: String,

    /// Status (True, False, Unknown)
    pub status: String,

    /// Last transition time
    pub last_transition_time: DateTime<Utc>,

    /// Reason for the condition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Feed {
    /// Revision counter used as the idempotency fingerprint
    pub fn revision(&self) -> i64 {
        self.metadata.generation.unwrap_or(0)
    }

    /// put.io feed ID recorded in status, if any
    pub fn remote_id(&self) -> Option<u64> {
        self.status.as_ref().and_then(|s| s.id)
    }

    pub fn auth_secret_ref(&self) -> &AuthSecretRef {
        &self.spec.auth_secret_ref
    }

    pub fn has_finalizer(&self, finalizer: &str) -> bool {
        self.metadata
            .finalizers
            .as_ref()
            .is_some_and(|f| f.iter().any(|x| x == finalizer))
    }

    pub fn is_being_deleted(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }
}

/// Fill in defaults the API server leaves unset
pub fn default_feed_spec(mut spec: FeedSpec) -> FeedSpec {
    if spec.parent_dir_id.is_none() {
        spec.parent_dir_id = Some(DEFAULT_PARENT_DIR_ID);
    }
    spec
}

/// Validate a Feed spec before it is admitted
pub fn validate_feed_spec(spec: &FeedSpec) -> Result<()> {
    if spec.title.trim().is_empty() {
        return Err(Error::validation("Feed title must not be empty"));
    }

    // The title is embedded as the first segment of the managed put.io title
    if spec.title.contains('|') {
        return Err(Error::validation(format!(
            "Feed title '{}' must not contain '|'",
            spec.title
        )));
    }

    match url::Url::parse(&spec.rss_source_url) {
        Ok(u) if u.has_host() => {}
        Ok(_) => {
            return Err(Error::validation(format!(
                "Invalid RSS source URL '{}': missing host",
                spec.rss_source_url
            )));
        }
        Err(e) => {
            return Err(Error::validation(format!(
                "Invalid RSS source URL '{}': {}",
                spec.rss_source_url, e
            )));
        }
    }

    if spec.keyword.trim().is_empty() {
        return Err(Error::validation("At least one keyword must be specified"));
    }

    if spec.auth_secret_ref.name.is_empty() || spec.auth_secret_ref.key.is_empty() {
        return Err(Error::validation(
            "Auth secret reference requires both a name and a key",
        ));
    }

    Ok(())
}
