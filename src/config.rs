//! Operator configuration
//!
//! Everything is read from environment variables so the operator can be
//! configured from its Deployment manifest.

use std::str::FromStr;
use std::time::Duration;

use crate::adapters::DEFAULT_API_URL;
use crate::error::{Error, Result};
use crate::reconcilers::feed::DEFAULT_CONTROLLER_IDENTITY;
use crate::reconcilers::ReconcileSettings;

/// Default metrics port
pub const DEFAULT_METRICS_PORT: u16 = 8080;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;

/// Runtime configuration of the operator
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorConfig {
    /// put.io API base URL
    pub api_url: String,
    /// Timeout applied to every put.io request
    pub request_timeout: Duration,
    /// Identity embedded in managed feed titles
    pub controller_identity: String,
    /// Delay between periodic re-syncs of a healthy Feed
    pub resync_interval: Duration,
    /// Port of the metrics/health server
    pub metrics_port: u16,
    /// Restrict the watch to one namespace (all namespaces when `None`)
    pub watch_namespace: Option<String>,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            controller_identity: DEFAULT_CONTROLLER_IDENTITY.to_string(),
            resync_interval: Duration::from_secs(DEFAULT_RESYNC_INTERVAL_SECS),
            metrics_port: DEFAULT_METRICS_PORT,
            watch_namespace: None,
        }
    }
}

impl OperatorConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let api_url = get("PUTIO_API_URL").unwrap_or(defaults.api_url);
        url::Url::parse(&api_url)
            .map_err(|e| Error::config(format!("Invalid PUTIO_API_URL '{}': {}", api_url, e)))?;

        Ok(Self {
            api_url,
            request_timeout: get("PUTIO_REQUEST_TIMEOUT_SECS")
                .map(|v| parse_number::<u64>("PUTIO_REQUEST_TIMEOUT_SECS", &v))
                .transpose()?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            controller_identity: get("CONTROLLER_IDENTITY").unwrap_or(defaults.controller_identity),
            resync_interval: get("RESYNC_INTERVAL_SECS")
                .map(|v| parse_number::<u64>("RESYNC_INTERVAL_SECS", &v))
                .transpose()?
                .map(Duration::from_secs)
                .unwrap_or(defaults.resync_interval),
            metrics_port: get("METRICS_PORT")
                .map(|v| parse_number::<u16>("METRICS_PORT", &v))
                .transpose()?
                .unwrap_or(defaults.metrics_port),
            watch_namespace: get("WATCH_NAMESPACE"),
        })
    }

    pub fn reconcile_settings(&self) -> ReconcileSettings {
        ReconcileSettings {
            controller_identity: self.controller_identity.clone(),
            resync_interval: self.resync_interval,
        }
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::config(format!("Invalid {} '{}': {}", key, raw, e)))
}
