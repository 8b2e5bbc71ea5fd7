//! Kubernetes controllers for the Feed CRD
//!
//! This module contains the controller that watches Feed changes and triggers
//! reconciliation.

mod feed_controller;

pub use feed_controller::{error_policy, run as run_feed_controller};

use kube::Client;

use crate::adapters::{KubeFeedStore, PutioConnector};
use crate::config::OperatorConfig;
use crate::reconcilers::ReconcileSettings;

/// Shared context for the controller
pub struct Context {
    /// Feed store backed by the client
    pub store: KubeFeedStore,
    /// Builds put.io clients from Feed auth tokens
    pub connector: PutioConnector,
    /// Reconciliation settings
    pub settings: ReconcileSettings,
}

impl Context {
    /// Create a new context
    pub fn new(client: Client, config: &OperatorConfig) -> Self {
        Self {
            store: KubeFeedStore::new(client),
            connector: PutioConnector::new(config.api_url.clone(), config.request_timeout),
            settings: config.reconcile_settings(),
        }
    }
}
