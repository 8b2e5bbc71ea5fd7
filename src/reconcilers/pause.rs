//! Pause state synchronization
//!
//! put.io models pausing as its own action rather than a feed field, so the
//! desired flag is pushed separately after a create or update.

use tracing::info;

use crate::adapters::{FeedGateway, GatewayResult};
use crate::metrics;

/// The remote action matching a desired paused flag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PauseAction {
    Pause,
    Resume,
}

impl PauseAction {
    pub fn for_desired(paused: bool) -> Self {
        if paused {
            PauseAction::Pause
        } else {
            PauseAction::Resume
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PauseAction::Pause => "pause",
            PauseAction::Resume => "resume",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            PauseAction::Pause => "paused",
            PauseAction::Resume => "resumed",
        }
    }
}

/// Issue exactly one pause or resume call for feed `id`
pub async fn sync_pause_state<G>(gateway: &G, id: u64, paused: bool) -> GatewayResult<PauseAction>
where
    G: FeedGateway + ?Sized,
{
    let action = PauseAction::for_desired(paused);
    info!(id, action = action.as_str(), "Syncing put.io pause state");

    let result = match action {
        PauseAction::Pause => gateway.pause(id).await,
        PauseAction::Resume => gateway.resume(id).await,
    };

    metrics::record_remote_call(action.as_str(), &result);
    result.map(|_| action)
}
