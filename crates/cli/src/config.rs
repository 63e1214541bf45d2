use std::time::Duration;

use overlay_core::marker::{ACTIVE_MARKER_CLASS, COMPLETED_MARKER_CLASS};
use overlay_core::{InstanceId, MarkerClasses, ProcessId};

/// Default base URL of the BPM REST API.
const DEFAULT_API_URL: &str = "http://localhost:8080/bonita/API/bpm";

/// Default HTTP request timeout.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Overlay configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayConfig {
    /// Base API URL; `/diagram/{id}` and `/caseInfo/{id}` are appended.
    pub api_url: String,
    pub process_id: ProcessId,
    /// Cases to overlay. `None` entries stand for null ids and are
    /// skipped by the controller.
    pub case_ids: Vec<Option<InstanceId>>,
    /// Re-run a fresh session at this interval; `None` runs once.
    pub poll_interval: Option<Duration>,
    pub request_timeout: Duration,
    pub marker_classes: MarkerClasses,
}

/// Errors raised while reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl OverlayConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                 | Required | Default                                |
    /// |--------------------------|----------|----------------------------------------|
    /// | `BPM_API_URL`            | no       | `http://localhost:8080/bonita/API/bpm` |
    /// | `PROCESS_ID`             | yes      | --                                     |
    /// | `CASE_IDS`               | no       | empty (comma separated)                |
    /// | `POLL_INTERVAL_SECS`     | no       | unset, run once                        |
    /// | `REQUEST_TIMEOUT_SECS`   | no       | `30`                                   |
    /// | `ACTIVE_MARKER_CLASS`    | no       | `bpmn-activity-success`                |
    /// | `COMPLETED_MARKER_CLASS` | no       | `bpmn-activity-completed`              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("BPM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let process_id = non_empty("PROCESS_ID")
            .map(|v| v.trim().to_string())
            .ok_or(ConfigError::Missing("PROCESS_ID"))?;

        let case_ids = lookup("CASE_IDS")
            .map(|raw| parse_case_ids(&raw))
            .unwrap_or_default();

        let poll_interval = match non_empty("POLL_INTERVAL_SECS") {
            Some(raw) => match parse_secs("POLL_INTERVAL_SECS", &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        let request_timeout = match non_empty("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_secs("REQUEST_TIMEOUT_SECS", &raw)?),
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let marker_classes = MarkerClasses::new(
            non_empty("ACTIVE_MARKER_CLASS").unwrap_or_else(|| ACTIVE_MARKER_CLASS.to_string()),
            non_empty("COMPLETED_MARKER_CLASS")
                .unwrap_or_else(|| COMPLETED_MARKER_CLASS.to_string()),
        );

        Ok(Self {
            api_url,
            process_id,
            case_ids,
            poll_interval,
            request_timeout,
            marker_classes,
        })
    }
}

/// Split a comma-separated id list. Blank entries and the literal `null`
/// become `None`.
pub fn parse_case_ids(raw: &str) -> Vec<Option<InstanceId>> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',')
        .map(str::trim)
        .map(|id| {
            if id.is_empty() || id.eq_ignore_ascii_case("null") {
                None
            } else {
                Some(id.to_string())
            }
        })
        .collect()
}

fn parse_secs(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected: "a whole number of seconds",
        value: raw.to_string(),
    })
}
