//! Desired-state store
//!
//! [`FeedStore`] is everything the reconcilers need from Kubernetes: reading
//! Feeds and their auth secrets, persisting finalizers and status, and
//! publishing audit events.

use std::fmt;

use async_trait::async_trait;
use kube::{
    api::{Patch, PatchParams},
    runtime::events::{Event, EventType, Recorder, Reporter},
    Api, Client, Resource, ResourceExt,
};
use serde_json::json;
use tracing::warn;

use crate::crd::{AuthSecretRef, Feed, FeedStatus};
use crate::error::Result;
use crate::reconcilers::events::{AuditEvent, EventSeverity};
use crate::reconcilers::status::status_patch;

use super::secrets::get_auth_token;

/// Field manager used for every write
pub const FIELD_MANAGER: &str = "putio-feed-operator";

/// Namespaced name of a Feed
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FeedKey {
    pub namespace: String,
    pub name: String,
}

impl FeedKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn from_feed(feed: &Feed) -> Self {
        Self::new(
            feed.namespace().unwrap_or_else(|| "default".to_string()),
            feed.name_any(),
        )
    }
}

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Access to Feed objects and their surroundings
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Load a Feed, `None` when it no longer exists
    async fn get_feed(&self, key: &FeedKey) -> Result<Option<Feed>>;

    /// Resolve the put.io token referenced by a Feed
    async fn auth_token(&self, namespace: &str, secret_ref: &AuthSecretRef) -> Result<String>;

    /// Persist a new finalizer list, returning the updated object
    async fn replace_finalizers(&self, feed: &Feed, finalizers: Vec<String>) -> Result<Feed>;

    /// Persist observed status
    async fn patch_status(&self, feed: &Feed, status: &FeedStatus) -> Result<()>;

    /// Publish an audit event; failures are logged, never returned
    async fn record(&self, feed: &Feed, event: &AuditEvent);
}

/// [`FeedStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeFeedStore {
    client: Client,
    reporter: Reporter,
}

impl KubeFeedStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            reporter: Reporter {
                controller: FIELD_MANAGER.to_string(),
                instance: std::env::var("POD_NAME").ok(),
            },
        }
    }

    fn api(&self, namespace: &str) -> Api<Feed> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl FeedStore for KubeFeedStore {
    async fn get_feed(&self, key: &FeedKey) -> Result<Option<Feed>> {
        Ok(self.api(&key.namespace).get_opt(&key.name).await?)
    }

    async fn auth_token(&self, namespace: &str, secret_ref: &AuthSecretRef) -> Result<String> {
        get_auth_token(&self.client, namespace, secret_ref).await
    }

    async fn replace_finalizers(&self, feed: &Feed, finalizers: Vec<String>) -> Result<Feed> {
        let key = FeedKey::from_feed(feed);
        // resourceVersion makes the write fail instead of clobbering a concurrent change
        let patch = json!({
            "metadata": {
                "finalizers": finalizers,
                "resourceVersion": feed.resource_version(),
            }
        });
        let updated = self
            .api(&key.namespace)
            .patch(&key.name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(patch))
            .await?;
        Ok(updated)
    }

    async fn patch_status(&self, feed: &Feed, status: &FeedStatus) -> Result<()> {
        let key = FeedKey::from_feed(feed);
        let patch = status_patch(status)?;
        self.api(&key.namespace)
            .patch_status(&key.name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(patch))
            .await?;
        Ok(())
    }

    async fn record(&self, feed: &Feed, event: &AuditEvent) {
        let recorder = Recorder::new(
            self.client.clone(),
            self.reporter.clone(),
            feed.object_ref(&()),
        );
        let type_ = match event.severity() {
            EventSeverity::Normal => EventType::Normal,
            EventSeverity::Warning => EventType::Warning,
        };

        if let Err(e) = recorder
            .publish(Event {
                type_,
                reason: event.reason().to_string(),
                note: Some(event.note()),
                action: event.action().to_string(),
                secondary: None,
            })
            .await
        {
            warn!(error = %e, reason = event.reason(), "Failed to publish event");
        }
    }
}
