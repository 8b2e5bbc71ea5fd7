//! Feed controller
//!
//! Watches Feed resources and triggers reconciliation.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::{
    api::ListParams,
    runtime::{
        controller::{Action, Controller},
        watcher::Config as WatcherConfig,
    },
    Api, Client, ResourceExt,
};
use tracing::{error, info, instrument};

use crate::adapters::{FeedKey, GatewayError};
use crate::controllers::Context;
use crate::crd::Feed;
use crate::error::{Error, Result};
use crate::metrics;
use crate::reconcilers::reconcile_feed;

const KIND: &str = "Feed";

/// Run the Feed controller
pub async fn run(client: Client, context: Arc<Context>, namespace: Option<String>) {
    let api: Api<Feed> = match namespace.as_deref() {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };

    // Verify CRD is installed
    if let Err(e) = api.list(&ListParams::default().limit(1)).await {
        error!("Feed CRD not installed: {}", e);
        return;
    }

    info!(namespace = namespace.as_deref().unwrap_or("*"), "Starting Feed controller");

    Controller::new(api, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|result| async move {
            match result {
                Ok((obj, _action)) => {
                    info!(
                        name = %obj.name,
                        namespace = obj.namespace.as_deref().unwrap_or("default"),
                        "Reconciled Feed"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Reconciliation error");
                }
            }
        })
        .await;
}

/// Main reconciliation function
#[instrument(skip(ctx), fields(name = %obj.name_any(), namespace = obj.namespace()))]
async fn reconcile(obj: Arc<Feed>, ctx: Arc<Context>) -> Result<Action> {
    let _timer = metrics::RECONCILE_DURATION
        .with_label_values(&[KIND])
        .start_timer();
    metrics::RECONCILIATIONS.with_label_values(&[KIND]).inc();

    // Always work from a fresh read; the watch cache may lag behind our own writes
    let key = FeedKey::from_feed(&obj);
    reconcile_feed(&key, &ctx.store, &ctx.connector, &ctx.settings).await
}

/// Short label for an error, used in metrics
fn error_label(error: &Error) -> &'static str {
    match error {
        Error::Kube(_) => "kube",
        Error::Gateway(GatewayError::Status(_)) => "remote_status",
        Error::Gateway(_) => "remote",
        Error::PauseSync { .. } => "pause_sync",
        Error::MissingRemoteId(_) => "missing_remote_id",
        Error::SecretNotFound(_) | Error::SecretKeyNotFound { .. } => "secret",
        Error::Config(_) => "config",
        Error::Validation(_) => "validation",
        Error::Serialization(_) => "serialization",
    }
}

/// Requeue delay for a failed reconciliation
pub fn requeue_delay(error: &Error) -> Duration {
    match error {
        Error::PauseSync { .. } => Duration::from_secs(15),
        Error::Kube(_) | Error::Gateway(_) | Error::Serialization(_) => Duration::from_secs(30),
        Error::SecretNotFound(_) | Error::SecretKeyNotFound { .. } => Duration::from_secs(60),
        Error::MissingRemoteId(_) | Error::Config(_) | Error::Validation(_) => {
            Duration::from_secs(300)
        }
    }
}

/// Error policy for the controller
pub fn error_policy(obj: Arc<Feed>, error: &Error, _ctx: Arc<Context>) -> Action {
    let name = obj.name_any();
    error!(
        name = %name,
        error = %error,
        "Reconciliation failed, scheduling retry"
    );
    metrics::RECONCILIATION_ERRORS
        .with_label_values(&[KIND, error_label(error)])
        .inc();

    Action::requeue(requeue_delay(error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_failures_retry_fastest() {
        let pause = Error::PauseSync {
            id: 1,
            source: GatewayError::Status("ERROR".to_string()),
        };
        let remote = Error::Gateway(GatewayError::Decode("x".to_string()));
        assert!(requeue_delay(&pause) < requeue_delay(&remote));
    }

    #[test]
    fn test_local_inconsistency_backs_off() {
        let err = Error::MissingRemoteId("test-feed".to_string());
        assert_eq!(requeue_delay(&err), Duration::from_secs(300));
        assert_eq!(error_label(&err), "missing_remote_id");
    }
}
