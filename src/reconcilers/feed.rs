//! Feed reconciler
//!
//! Drives one Feed toward its put.io counterpart:
//! - finalizer registration and remote deletion
//! - create/update guided by the title fingerprint
//! - pause state synchronization
//! - status projection

use std::time::Duration;

use chrono::Utc;
use kube::runtime::controller::Action;
use tracing::{debug, info, warn};

use crate::adapters::{FeedFields, FeedGateway, FeedKey, FeedStore, GatewayConnector, RemoteFeed};
use crate::crd::{default_feed_spec, validate_feed_spec, Feed};
use crate::error::{Error, Result};
use crate::metrics;

use super::events::AuditEvent;
use super::finalizer::{self, DeleteOutcome, FINALIZER_NAME};
use super::fingerprint;
use super::pause;
use super::status;

/// Default controller identity embedded in managed titles
pub const DEFAULT_CONTROLLER_IDENTITY: &str = "Kubernetes/putio-operator";

/// Knobs of the reconciliation loop
#[derive(Clone, Debug)]
pub struct ReconcileSettings {
    /// Identity written into the `managed by` title segment
    pub controller_identity: String,
    /// Delay before re-reading put.io after a successful sync
    pub resync_interval: Duration,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            controller_identity: DEFAULT_CONTROLLER_IDENTITY.to_string(),
            resync_interval: Duration::from_secs(300),
        }
    }
}

/// What the sync step did to the remote feed fields
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mutation {
    Created,
    Updated,
    Unchanged,
}

/// Publish `event` built from the error text when `result` failed
async fn reported<S, T>(
    store: &S,
    feed: &Feed,
    result: Result<T>,
    event: fn(String) -> AuditEvent,
) -> Result<T>
where
    S: FeedStore + ?Sized,
{
    if let Err(e) = &result {
        store.record(feed, &event(e.to_string())).await;
    }
    result
}

/// Reconcile the Feed identified by `key`
pub async fn reconcile_feed<S, C>(
    key: &FeedKey,
    store: &S,
    connector: &C,
    settings: &ReconcileSettings,
) -> Result<Action>
where
    S: FeedStore + ?Sized,
    C: GatewayConnector + ?Sized,
{
    let Some(feed) = store.get_feed(key).await? else {
        debug!(feed = %key, "Feed no longer exists");
        return Ok(Action::await_change());
    };

    info!(feed = %key, generation = feed.revision(), "Reconciling Feed");
    store.record(&feed, &AuditEvent::ReconciliationStarted).await;

    let token = reported(
        store,
        &feed,
        store.auth_token(&key.namespace, feed.auth_secret_ref()).await,
        AuditEvent::AuthSecretUnavailable,
    )
    .await?;
    let gateway = reported(
        store,
        &feed,
        connector.connect(&token).map_err(Error::from),
        AuditEvent::AuthSecretUnavailable,
    )
    .await?;

    if feed.is_being_deleted() {
        return cleanup(&feed, store, &gateway).await;
    }

    // Checked before the finalizer so a Feed that never synced stays deletable
    let spec = default_feed_spec(feed.spec.clone());
    if let Err(e) = validate_feed_spec(&spec) {
        warn!(feed = %key, error = %e, "Feed spec is invalid");
        store.record(&feed, &AuditEvent::InvalidSpec(e.to_string())).await;
        return Err(e);
    }

    let mut feed = match reported(
        store,
        &feed,
        finalizer::ensure(store, &feed).await,
        AuditEvent::FinalizerAddFailed,
    )
    .await?
    {
        Some(updated) => {
            store.record(&updated, &AuditEvent::FinalizerAdded).await;
            updated
        }
        None => feed,
    };
    feed.spec = spec;

    let mutation = synchronize(&feed, store, &gateway, settings).await?;
    info!(feed = %key, ?mutation, "Feed synchronized");
    Ok(Action::requeue(settings.resync_interval))
}

/// Deletion path: remove the remote feed, then release the finalizer
async fn cleanup<S, G>(feed: &Feed, store: &S, gateway: &G) -> Result<Action>
where
    S: FeedStore + ?Sized,
    G: FeedGateway + ?Sized,
{
    if !feed.has_finalizer(FINALIZER_NAME) {
        return Ok(Action::await_change());
    }

    let outcome = reported(
        store,
        feed,
        finalizer::delete_remote(gateway, feed).await,
        AuditEvent::RemoteDeleteFailed,
    )
    .await?;
    store
        .record(
            feed,
            &AuditEvent::RemoteDeleted {
                already_gone: outcome == DeleteOutcome::AlreadyGone,
            },
        )
        .await;

    reported(
        store,
        feed,
        finalizer::release(store, feed).await,
        AuditEvent::FinalizerRemoveFailed,
    )
    .await?;

    Ok(Action::await_change())
}

/// Look up the remote feed recorded in status
///
/// A recorded id that put.io no longer knows is treated like no id at all so
/// the feed gets recreated.
async fn lookup<G>(feed: &Feed, gateway: &G) -> Result<Option<RemoteFeed>>
where
    G: FeedGateway + ?Sized,
{
    let Some(id) = feed.remote_id() else {
        return Ok(None);
    };

    match gateway.get(id).await {
        Ok(remote) => Ok(Some(remote)),
        Err(e) if e.is_not_found() => {
            warn!(id, "put.io feed vanished, recreating it");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Sync path: create or update the remote feed, then pause state, then status
///
/// Pause state is only pushed after a create or update. A Feed left untouched
/// keeps whatever pause state put.io reports.
async fn synchronize<S, G>(
    feed: &Feed,
    store: &S,
    gateway: &G,
    settings: &ReconcileSettings,
) -> Result<Mutation>
where
    S: FeedStore + ?Sized,
    G: FeedGateway + ?Sized,
{
    let revision = feed.revision();
    let title = fingerprint::encode_title(&feed.spec.title, revision, &settings.controller_identity);

    let existing = reported(
        store,
        feed,
        lookup(feed, gateway).await,
        AuditEvent::RemoteSyncFailed,
    )
    .await?;

    let (remote, mutation) = match existing {
        None => {
            let fields = FeedFields::from_spec(&feed.spec, title).with_paused(feed.spec.paused);
            let result = gateway.create(&fields).await;
            metrics::record_remote_call("create", &result);
            let created = reported(
                store,
                feed,
                result.map_err(Error::from),
                AuditEvent::RemoteSyncFailed,
            )
            .await?;
            info!(id = created.id, "Created put.io feed");
            store.record(feed, &AuditEvent::RemoteCreated { id: created.id }).await;

            // Record the id right away so a failure below cannot lead to a duplicate create
            let early = status::project(feed, &created, Utc::now());
            reported(
                store,
                feed,
                store.patch_status(feed, &early).await,
                AuditEvent::StatusUpdateFailed,
            )
            .await?;

            (created, Mutation::Created)
        }
        Some(remote) if fingerprint::is_current(&remote.title, revision) => {
            debug!(id = remote.id, revision, "put.io feed already up to date");
            store.record(feed, &AuditEvent::RemoteUnchanged { id: remote.id }).await;
            (remote, Mutation::Unchanged)
        }
        Some(remote) => {
            let fields = FeedFields::from_spec(&feed.spec, title);
            let result = gateway.update(&fields, remote.id).await;
            metrics::record_remote_call("update", &result);
            reported(
                store,
                feed,
                result.map_err(Error::from),
                AuditEvent::RemoteSyncFailed,
            )
            .await?;
            info!(id = remote.id, revision, "Updated put.io feed");
            store.record(feed, &AuditEvent::RemoteUpdated { id: remote.id }).await;
            (remote, Mutation::Updated)
        }
    };

    let observed = if mutation == Mutation::Unchanged {
        remote
    } else {
        match pause::sync_pause_state(gateway, remote.id, feed.spec.paused).await {
            Ok(action) => store.record(feed, &AuditEvent::PauseSynced(action)).await,
            Err(source) => {
                let message = source.to_string();
                store.record(feed, &AuditEvent::PauseSyncFailed(message.clone())).await;
                let failed = status::project_pause_failure(feed, remote.id, &message, Utc::now());
                if let Err(e) = store.patch_status(feed, &failed).await {
                    warn!(error = %e, "Unable to record pause failure in status");
                }
                return Err(Error::PauseSync { id: remote.id, source });
            }
        }

        reported(
            store,
            feed,
            gateway.get(remote.id).await.map_err(Error::from),
            AuditEvent::RemoteSyncFailed,
        )
        .await?
    };

    let projected = status::project(feed, &observed, Utc::now());
    if feed.status.as_ref() != Some(&projected) {
        reported(
            store,
            feed,
            store.patch_status(feed, &projected).await,
            AuditEvent::StatusUpdateFailed,
        )
        .await?;
        store.record(feed, &AuditEvent::StatusUpdated).await;
    }

    Ok(mutation)
}
