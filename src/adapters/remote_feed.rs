//! put.io RSS feed wire model

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Timestamp layouts used by put.io (no zone, UTC implied)
const REMOTE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// RSS feed as returned by put.io
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RemoteFeed {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub rss_source_url: String,
    #[serde(default)]
    pub parent_dir_id: Option<u64>,
    #[serde(default)]
    pub delete_old_files: bool,
    #[serde(default)]
    pub dont_process_whole_feed: bool,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub unwanted_keywords: Option<String>,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub extract: bool,
    #[serde(default)]
    pub failed_item_count: u64,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default, deserialize_with = "remote_time")]
    pub last_fetch: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "remote_time")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "remote_time")]
    pub paused_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "remote_time")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "remote_time")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteFeed {
    /// Last fetch error, `None` when put.io reports none
    pub fn error_text(&self) -> Option<&str> {
        self.last_error.as_deref().filter(|e| !e.trim().is_empty())
    }
}

/// Parse a put.io timestamp, accepting RFC 3339 as well
pub fn parse_remote_time(raw: &str) -> Option<DateTime<Utc>> {
    REMOTE_TIME_FORMATS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .map(|t| t.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|t| t.with_timezone(&Utc))
        })
}

fn remote_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_remote_time(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid put.io timestamp '{}'", s))),
    }
}
