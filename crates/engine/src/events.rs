//! Events published by an overlay session.
//!
//! Every failure the controller handles is published here, so a caller
//! subscribed with [`OverlayController::subscribe`](crate::OverlayController::subscribe)
//! can tell a diagram failure from a per-instance status failure.

use chrono::Utc;
use overlay_core::{FetchError, InstanceId, ProcessId, Timestamp};
use serde::Serialize;
use uuid::Uuid;

/// Envelope for every event of one session.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayEvent {
    pub session_id: Uuid,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub kind: OverlayEventKind,
}

impl OverlayEvent {
    pub fn new(session_id: Uuid, kind: OverlayEventKind) -> Self {
        Self {
            session_id,
            timestamp: Utc::now(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayEventKind {
    /// The diagram was fetched and handed to the renderer.
    DiagramLoaded {
        process_id: ProcessId,
        url: String,
        elements: usize,
    },

    /// The diagram could not be fetched or rendered. The session is over.
    DiagramLoadFailed {
        process_id: ProcessId,
        url: Option<String>,
        status: Option<u16>,
        error: String,
    },

    /// One instance's snapshot was classified and its markers applied.
    MarkersApplied {
        instance_id: InstanceId,
        /// Display names marked active.
        active: Vec<String>,
        /// Display names marked completed.
        completed: Vec<String>,
    },

    /// One instance's status could not be fetched. Other instances are
    /// unaffected.
    InstanceStatusFailed {
        instance_id: InstanceId,
        url: String,
        status: Option<u16>,
        error: String,
    },

    /// Every instance overlay has been attempted.
    SessionCompleted {
        process_id: ProcessId,
        instances: usize,
        failed: usize,
    },
}

impl OverlayEventKind {
    pub(crate) fn instance_failed(instance_id: &str, error: &FetchError) -> Self {
        Self::InstanceStatusFailed {
            instance_id: instance_id.to_string(),
            url: error.url().to_string(),
            status: error.status(),
            error: error.to_string(),
        }
    }

    /// Whether this event reports a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::DiagramLoadFailed { .. } | Self::InstanceStatusFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = OverlayEvent::new(
            Uuid::nil(),
            OverlayEventKind::instance_failed(
                "I1",
                &FetchError::Remote {
                    status: 503,
                    url: "http://bpm/caseInfo/I1".to_string(),
                },
            ),
        );

        let json = serde_json::to_value(&event).expect("event should serialize");
        assert_eq!(json["type"], "instance_status_failed");
        assert_eq!(json["instance_id"], "I1");
        assert_eq!(json["status"], 503);
        assert_eq!(json["url"], "http://bpm/caseInfo/I1");
        assert!(json["timestamp"].is_string());
        assert!(event.kind.is_failure());
    }

    #[test]
    fn completion_is_not_a_failure() {
        let kind = OverlayEventKind::SessionCompleted {
            process_id: "P1".to_string(),
            instances: 2,
            failed: 1,
        };
        assert!(!kind.is_failure());
    }
}
