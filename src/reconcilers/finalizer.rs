//! Finalizer handling
//!
//! The finalizer keeps the Feed in the store until its put.io counterpart is
//! confirmed gone.

use tracing::{info, warn};

use crate::adapters::{FeedGateway, FeedStore};
use crate::crd::Feed;
use crate::error::{Error, Result};
use crate::metrics;

/// Finalizer name for Feed resources
pub const FINALIZER_NAME: &str = "feed.skynewz.dev/finalizer";

/// Result of a successful remote deletion
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyGone,
}

fn current_finalizers(feed: &Feed) -> Vec<String> {
    feed.metadata.finalizers.clone().unwrap_or_default()
}

/// Add the finalizer if missing, returning the persisted object when it changed
pub async fn ensure<S>(store: &S, feed: &Feed) -> Result<Option<Feed>>
where
    S: FeedStore + ?Sized,
{
    if feed.has_finalizer(FINALIZER_NAME) {
        return Ok(None);
    }

    let mut finalizers = current_finalizers(feed);
    finalizers.push(FINALIZER_NAME.to_string());
    let updated = store.replace_finalizers(feed, finalizers).await?;
    info!("Added finalizer");
    Ok(Some(updated))
}

/// Delete the put.io feed recorded in status
///
/// Without a recorded id there is nothing safe to delete; the finalizer stays
/// and the inconsistency is surfaced.
pub async fn delete_remote<G>(gateway: &G, feed: &Feed) -> Result<DeleteOutcome>
where
    G: FeedGateway + ?Sized,
{
    let Some(id) = feed.remote_id() else {
        return Err(Error::MissingRemoteId(
            feed.metadata.name.clone().unwrap_or_default(),
        ));
    };

    info!(id, "Deleting put.io feed");
    let result = gateway.delete(id).await;
    metrics::record_remote_call("delete", &result);

    match result {
        Ok(()) => Ok(DeleteOutcome::Deleted),
        Err(e) if e.is_not_found() => {
            warn!(id, "put.io feed already deleted");
            Ok(DeleteOutcome::AlreadyGone)
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove the finalizer so the store can drop the Feed
pub async fn release<S>(store: &S, feed: &Feed) -> Result<()>
where
    S: FeedStore + ?Sized,
{
    let finalizers: Vec<String> = current_finalizers(feed)
        .into_iter()
        .filter(|f| f != FINALIZER_NAME)
        .collect();
    store.replace_finalizers(feed, finalizers).await?;
    info!("Removed finalizer");
    Ok(())
}
