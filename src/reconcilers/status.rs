//! Projection of observed put.io state into Feed status

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::adapters::RemoteFeed;
use crate::crd::{Condition, Feed, FeedStatus};
use crate::error::Result;

use super::events::{ConditionReason, ConditionType};

/// Status keys that must be cleared explicitly in a merge patch
const NULLABLE_STATUS_KEYS: [&str; 5] = ["lastError", "lastFetch", "pausedAt", "createdAt", "updatedAt"];

/// Set a condition, last writer wins per type
///
/// The transition time only moves when the status value flips.
pub fn upsert_condition(
    conditions: &mut Vec<Condition>,
    type_: ConditionType,
    reason: ConditionReason,
    message: &str,
    now: DateTime<Utc>,
) {
    let status = if reason.is_available() { "True" } else { "False" };

    if let Some(existing) = conditions.iter_mut().find(|c| c.type_ == type_.as_str()) {
        if existing.status != status {
            existing.last_transition_time = now;
        }
        existing.status = status.to_string();
        existing.reason = Some(reason.as_str().to_string());
        existing.message = Some(message.to_string());
        return;
    }

    conditions.push(Condition {
        type_: type_.as_str().to_string(),
        status: status.to_string(),
        last_transition_time: now,
        reason: Some(reason.as_str().to_string()),
        message: Some(message.to_string()),
    });
}

/// Status reflecting `remote` as observed for the current generation of `feed`
pub fn project(feed: &Feed, remote: &RemoteFeed, now: DateTime<Utc>) -> FeedStatus {
    let mut status = feed.status.clone().unwrap_or_default();

    status.id = Some(remote.id);
    status.last_error = remote.error_text().map(str::to_string);
    status.failed_item_count = remote.failed_item_count;
    status.last_fetch = remote.last_fetch;
    status.paused_at = remote.paused_at;
    status.created_at = remote.created_at;
    status.updated_at = remote.updated_at;
    status.observed_generation = Some(feed.revision());

    match remote.error_text() {
        // A failed pause/resume stays reported until put.io agrees with the spec
        None if remote.paused != feed.spec.paused && pause_failure_reported(&status) => {}
        None => upsert_condition(
            &mut status.conditions,
            ConditionType::Available,
            ConditionReason::Deployed,
            "deployed",
            now,
        ),
        Some(error) => upsert_condition(
            &mut status.conditions,
            ConditionType::Available,
            ConditionReason::FailedToDeploy,
            error,
            now,
        ),
    }

    status
}

fn pause_failure_reported(status: &FeedStatus) -> bool {
    status.conditions.iter().any(|c| {
        c.type_ == ConditionType::Available.as_str()
            && c.reason.as_deref() == Some(ConditionReason::PauseSyncFailed.as_str())
    })
}

/// Status recording a pause/resume failure for remote feed `id`
///
/// The id is kept so the next attempt finds the feed instead of creating a
/// second one.
pub fn project_pause_failure(feed: &Feed, id: u64, error: &str, now: DateTime<Utc>) -> FeedStatus {
    let mut status = feed.status.clone().unwrap_or_default();
    status.id = Some(id);
    upsert_condition(
        &mut status.conditions,
        ConditionType::Available,
        ConditionReason::PauseSyncFailed,
        error,
        now,
    );
    status
}

/// Merge patch body for `status`, nulling mirrored fields that are unset
pub fn status_patch(status: &FeedStatus) -> Result<Value> {
    let mut value = serde_json::to_value(status)?;
    if let Value::Object(map) = &mut value {
        for key in NULLABLE_STATUS_KEYS {
            map.entry(key).or_insert(Value::Null);
        }
    }
    Ok(serde_json::json!({ "status": value }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{AuthSecretRef, FeedSpec};
    use chrono::Duration;

    fn feed(status: Option<FeedStatus>) -> Feed {
        let mut feed = Feed::new(
            "test-feed",
            FeedSpec {
                title: "foo".to_string(),
                rss_source_url: "https://example.com/rss".to_string(),
                parent_dir_id: Some(0),
                delete_old_files: false,
                dont_process_whole_feed: false,
                keyword: "foo".to_string(),
                unwanted_keywords: None,
                paused: false,
                auth_secret_ref: AuthSecretRef {
                    name: "putio".to_string(),
                    key: "token".to_string(),
                },
            },
        );
        feed.metadata.generation = Some(3);
        feed.status = status;
        feed
    }

    fn remote(last_error: Option<&str>) -> RemoteFeed {
        RemoteFeed {
            id: 42,
            title: "foo|3|managed by X".to_string(),
            last_error: last_error.map(str::to_string),
            failed_item_count: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_healthy_remote_is_deployed() {
        let now = Utc::now();
        let status = project(&feed(None), &remote(None), now);

        assert_eq!(status.id, Some(42));
        assert_eq!(status.observed_generation, Some(3));
        assert_eq!(status.failed_item_count, 2);
        assert_eq!(status.conditions.len(), 1);
        let c = &status.conditions[0];
        assert_eq!(c.type_, "Available");
        assert_eq!(c.status, "True");
        assert_eq!(c.reason.as_deref(), Some("Deployed"));
        assert_eq!(c.message.as_deref(), Some("deployed"));
    }

    #[test]
    fn test_remote_error_fails_condition_with_its_text() {
        let status = project(&feed(None), &remote(Some("feed unreachable")), Utc::now());

        let c = &status.conditions[0];
        assert_eq!(c.status, "False");
        assert_eq!(c.reason.as_deref(), Some("FailedToDeploy"));
        assert_eq!(c.message.as_deref(), Some("feed unreachable"));
        assert_eq!(status.last_error.as_deref(), Some("feed unreachable"));
    }

    #[test]
    fn test_transition_time_kept_when_status_unchanged() {
        let earlier = Utc::now() - Duration::hours(1);
        let first = project(&feed(None), &remote(Some("a")), earlier);
        let second = project(&feed(Some(first)), &remote(Some("b")), Utc::now());

        assert_eq!(second.conditions.len(), 1);
        assert_eq!(second.conditions[0].last_transition_time, earlier);
        assert_eq!(second.conditions[0].message.as_deref(), Some("b"));
    }

    #[test]
    fn test_transition_time_moves_when_status_flips() {
        let earlier = Utc::now() - Duration::hours(1);
        let now = Utc::now();
        let first = project(&feed(None), &remote(Some("a")), earlier);
        let second = project(&feed(Some(first)), &remote(None), now);

        assert_eq!(second.conditions[0].status, "True");
        assert_eq!(second.conditions[0].last_transition_time, now);
        assert!(second.last_error.is_none());
    }

    #[test]
    fn test_pause_failure_keeps_id_and_is_distinguishable() {
        let status = project_pause_failure(&feed(None), 42, "invalid \"ERROR\" status", Utc::now());

        assert_eq!(status.id, Some(42));
        assert_eq!(status.conditions[0].status, "False");
        assert_eq!(status.conditions[0].reason.as_deref(), Some("PauseSyncFailed"));
    }

    #[test]
    fn test_pause_failure_outlives_projection_while_drifted() {
        let failed = project_pause_failure(&feed(None), 42, "ERROR", Utc::now());
        let mut drifted = remote(None);
        drifted.paused = true;

        let status = project(&feed(Some(failed.clone())), &drifted, Utc::now());
        assert_eq!(status.conditions, failed.conditions);

        let status = project(&feed(Some(failed)), &remote(None), Utc::now());
        assert_eq!(status.conditions[0].reason.as_deref(), Some("Deployed"));
    }

    #[test]
    fn test_status_patch_clears_unset_fields() {
        let status = project(&feed(None), &remote(None), Utc::now());
        let patch = status_patch(&status).unwrap();

        assert_eq!(patch["status"]["id"], 42);
        assert!(patch["status"]["lastError"].is_null());
        assert!(patch["status"].as_object().unwrap().contains_key("lastFetch"));
        assert_eq!(patch["status"]["conditions"][0]["type"], "Available");
    }
}
