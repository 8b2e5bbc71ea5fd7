//! Reconcilers for Feed resources
//!
//! This module contains the business logic for mirroring a Feed on put.io.
//! Reconcilers are responsible for:
//! - Registering and releasing the finalizer
//! - Creating, updating, pausing and deleting the remote feed
//! - Updating resource status

pub mod events;
pub mod feed;
pub mod finalizer;
pub mod fingerprint;
pub mod pause;
pub mod status;

pub use events::{AuditEvent, ConditionReason, ConditionType, EventSeverity};
pub use feed::{reconcile_feed, ReconcileSettings};
pub use finalizer::FINALIZER_NAME;
