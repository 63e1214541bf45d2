//! Marker classification: which visual class a flow node receives.

use serde::Serialize;

use crate::counters::FlowNodeCounters;

/// Default class for nodes with ready or waiting executions.
pub const ACTIVE_MARKER_CLASS: &str = "bpmn-activity-success";

/// Default class for nodes whose executions have all completed.
pub const COMPLETED_MARKER_CLASS: &str = "bpmn-activity-completed";

/// Visual state derived for one display name from one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerState {
    None,
    Active,
    Completed,
}

impl MarkerState {
    /// Classify a node from its counters.
    ///
    /// Rules are evaluated in order and the first match wins:
    /// `ready` or `waiting` set gives [`Active`](Self::Active), otherwise
    /// `completed` set gives [`Completed`](Self::Completed), otherwise
    /// [`None`](Self::None).
    pub fn classify(counters: &FlowNodeCounters) -> Self {
        if counters.ready.is_set() || counters.waiting.is_set() {
            Self::Active
        } else if counters.completed.is_set() {
            Self::Completed
        } else {
            Self::None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// Class names applied to the renderer for each non-`None` marker state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerClasses {
    pub active: String,
    pub completed: String,
}

impl MarkerClasses {
    pub fn new(active: impl Into<String>, completed: impl Into<String>) -> Self {
        Self {
            active: active.into(),
            completed: completed.into(),
        }
    }

    /// Class for `state`, or `None` when no marker should be applied.
    pub fn class_for(&self, state: MarkerState) -> Option<&str> {
        match state {
            MarkerState::None => None,
            MarkerState::Active => Some(self.active.as_str()),
            MarkerState::Completed => Some(self.completed.as_str()),
        }
    }
}

impl Default for MarkerClasses {
    fn default() -> Self {
        Self::new(ACTIVE_MARKER_CLASS, COMPLETED_MARKER_CLASS)
    }
}
