//! Audit events and condition reasons emitted while reconciling Feeds

use super::pause::PauseAction;

/// Severity of an audit event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventSeverity {
    Normal,
    Warning,
}

/// One observable step of a Feed reconciliation
///
/// Events are informational; publishing them never changes the outcome of a
/// reconcile.
#[derive(Clone, Debug, PartialEq)]
pub enum AuditEvent {
    ReconciliationStarted,
    AuthSecretUnavailable(String),
    InvalidSpec(String),
    FinalizerAdded,
    FinalizerAddFailed(String),
    RemoteCreated { id: u64 },
    RemoteUpdated { id: u64 },
    RemoteUnchanged { id: u64 },
    RemoteSyncFailed(String),
    PauseSynced(PauseAction),
    PauseSyncFailed(String),
    RemoteDeleted { already_gone: bool },
    RemoteDeleteFailed(String),
    FinalizerRemoveFailed(String),
    StatusUpdated,
    StatusUpdateFailed(String),
}

impl AuditEvent {
    pub fn severity(&self) -> EventSeverity {
        match self {
            AuditEvent::ReconciliationStarted
            | AuditEvent::FinalizerAdded
            | AuditEvent::RemoteCreated { .. }
            | AuditEvent::RemoteUpdated { .. }
            | AuditEvent::RemoteUnchanged { .. }
            | AuditEvent::PauseSynced(_)
            | AuditEvent::RemoteDeleted { .. }
            | AuditEvent::StatusUpdated => EventSeverity::Normal,
            AuditEvent::AuthSecretUnavailable(_)
            | AuditEvent::InvalidSpec(_)
            | AuditEvent::FinalizerAddFailed(_)
            | AuditEvent::RemoteSyncFailed(_)
            | AuditEvent::PauseSyncFailed(_)
            | AuditEvent::RemoteDeleteFailed(_)
            | AuditEvent::FinalizerRemoveFailed(_)
            | AuditEvent::StatusUpdateFailed(_) => EventSeverity::Warning,
        }
    }

    /// Machine-readable reason (CamelCase, as Kubernetes expects)
    pub fn reason(&self) -> &'static str {
        match self {
            AuditEvent::ReconciliationStarted => "ReconciliationStarted",
            AuditEvent::AuthSecretUnavailable(_) => "UnableToGetAuthSecret",
            AuditEvent::InvalidSpec(_) => "InvalidSpec",
            AuditEvent::FinalizerAdded => "AddedFinalizer",
            AuditEvent::FinalizerAddFailed(_) => "UnableToAddFinalizer",
            AuditEvent::RemoteCreated { .. } => "CreatedAtPutio",
            AuditEvent::RemoteUpdated { .. } => "UpdatedAtPutio",
            AuditEvent::RemoteUnchanged { .. } => "UpToDateAtPutio",
            AuditEvent::RemoteSyncFailed(_) => "UnableToCreateOrUpdateAtPutio",
            AuditEvent::PauseSynced(_) => "PauseStateSynced",
            AuditEvent::PauseSyncFailed(_) => "UnableToSyncPauseState",
            AuditEvent::RemoteDeleted { .. } => "DeletedAtPutio",
            AuditEvent::RemoteDeleteFailed(_) => "UnableToDeleteAtPutio",
            AuditEvent::FinalizerRemoveFailed(_) => "UnableToRemoveFinalizer",
            AuditEvent::StatusUpdated => "FeedStatusUpdated",
            AuditEvent::StatusUpdateFailed(_) => "UnableToUpdateFeedStatus",
        }
    }

    /// Controller action the event belongs to
    pub fn action(&self) -> &'static str {
        match self {
            AuditEvent::ReconciliationStarted => "Reconcile",
            AuditEvent::AuthSecretUnavailable(_) => "ResolveCredentials",
            AuditEvent::InvalidSpec(_) => "Validate",
            AuditEvent::FinalizerAdded
            | AuditEvent::FinalizerAddFailed(_)
            | AuditEvent::FinalizerRemoveFailed(_) => "Finalize",
            AuditEvent::RemoteCreated { .. }
            | AuditEvent::RemoteUpdated { .. }
            | AuditEvent::RemoteUnchanged { .. }
            | AuditEvent::RemoteSyncFailed(_) => "SyncFeed",
            AuditEvent::PauseSynced(_) | AuditEvent::PauseSyncFailed(_) => "SyncPauseState",
            AuditEvent::RemoteDeleted { .. } | AuditEvent::RemoteDeleteFailed(_) => "DeleteFeed",
            AuditEvent::StatusUpdated | AuditEvent::StatusUpdateFailed(_) => "UpdateStatus",
        }
    }

    /// Human-readable note
    pub fn note(&self) -> String {
        match self {
            AuditEvent::ReconciliationStarted => "starting reconciliation".to_string(),
            AuditEvent::FinalizerAdded => "instance finalizer added".to_string(),
            AuditEvent::RemoteCreated { id } => format!("feed {} created on put.io", id),
            AuditEvent::RemoteUpdated { id } => format!("feed {} updated on put.io", id),
            AuditEvent::RemoteUnchanged { id } => format!("feed {} already up to date", id),
            AuditEvent::PauseSynced(action) => format!("feed {}", action.past_tense()),
            AuditEvent::RemoteDeleted { already_gone: true } => {
                "feed was already gone from put.io".to_string()
            }
            AuditEvent::RemoteDeleted { already_gone: false } => {
                "feed successfully deleted".to_string()
            }
            AuditEvent::StatusUpdated => "feed status updated successfully".to_string(),
            AuditEvent::AuthSecretUnavailable(e)
            | AuditEvent::InvalidSpec(e)
            | AuditEvent::FinalizerAddFailed(e)
            | AuditEvent::RemoteSyncFailed(e)
            | AuditEvent::PauseSyncFailed(e)
            | AuditEvent::RemoteDeleteFailed(e)
            | AuditEvent::FinalizerRemoveFailed(e)
            | AuditEvent::StatusUpdateFailed(e) => e.clone(),
        }
    }
}

/// Condition types reported in Feed status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionType {
    Available,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::Available => "Available",
        }
    }
}

/// Reasons attached to the availability condition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionReason {
    /// put.io reports no fetch error
    Deployed,
    /// put.io reports a fetch error for the feed
    FailedToDeploy,
    /// Feed fields were written but the pause/resume action failed
    PauseSyncFailed,
}

impl ConditionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionReason::Deployed => "Deployed",
            ConditionReason::FailedToDeploy => "FailedToDeploy",
            ConditionReason::PauseSyncFailed => "PauseSyncFailed",
        }
    }

    /// Condition status implied by the reason
    pub fn is_available(&self) -> bool {
        match self {
            ConditionReason::Deployed => true,
            ConditionReason::FailedToDeploy | ConditionReason::PauseSyncFailed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_are_warnings() {
        let failures = [
            AuditEvent::AuthSecretUnavailable("x".into()),
            AuditEvent::InvalidSpec("x".into()),
            AuditEvent::FinalizerAddFailed("x".into()),
            AuditEvent::RemoteSyncFailed("x".into()),
            AuditEvent::PauseSyncFailed("x".into()),
            AuditEvent::RemoteDeleteFailed("x".into()),
            AuditEvent::FinalizerRemoveFailed("x".into()),
            AuditEvent::StatusUpdateFailed("x".into()),
        ];
        for event in failures {
            assert_eq!(event.severity(), EventSeverity::Warning, "{:?}", event);
            assert_eq!(event.note(), "x");
        }
    }

    #[test]
    fn test_pause_note_names_the_action() {
        assert_eq!(
            AuditEvent::PauseSynced(PauseAction::Pause).note(),
            "feed paused"
        );
        assert_eq!(
            AuditEvent::PauseSynced(PauseAction::Resume).note(),
            "feed resumed"
        );
    }

    #[test]
    fn test_only_deployed_is_available() {
        assert!(ConditionReason::Deployed.is_available());
        assert!(!ConditionReason::FailedToDeploy.is_available());
        assert!(!ConditionReason::PauseSyncFailed.is_available());
    }
}
