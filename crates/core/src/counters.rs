//! Per-node execution counters reported for one process instance.
//!
//! The backend reports, for every flow node display name, how many
//! executions of that node are in each state. Counts arrive as integers
//! in practice but older deployments send booleans or strings, so a
//! [`Counter`] accepts any of them and only its truthiness matters to the
//! overlay.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::InstanceId;

/// A boolish execution counter.
///
/// Decoding rules:
///
/// | JSON value               | Count            |
/// |--------------------------|------------------|
/// | `null` / missing         | `0`              |
/// | `true` / `false`         | `1` / `0`        |
/// | non-negative integer     | the integer      |
/// | any other number         | `1` unless zero  |
/// | numeric string           | the parsed value |
/// | `""` / `"false"`         | `0`              |
/// | other string, array, map | `1`              |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Counter(pub u64);

impl Counter {
    /// Whether at least one execution is in this state.
    pub fn is_set(self) -> bool {
        self.0 > 0
    }

    fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        let count = match value {
            Value::Null => 0,
            Value::Bool(b) => u64::from(*b),
            Value::Number(n) => match n.as_u64() {
                Some(count) => count,
                None => u64::from(n.as_f64().is_some_and(|f| f != 0.0)),
            },
            Value::String(s) => {
                let s = s.trim();
                match s.parse::<u64>() {
                    Ok(count) => count,
                    Err(_) => u64::from(!(s.is_empty() || s.eq_ignore_ascii_case("false"))),
                }
            }
            Value::Array(_) | Value::Object(_) => 1,
        };
        Self(count)
    }
}

impl From<u64> for Counter {
    fn from(count: u64) -> Self {
        Self(count)
    }
}

impl From<bool> for Counter {
    fn from(set: bool) -> Self {
        Self(u64::from(set))
    }
}

impl<'de> Deserialize<'de> for Counter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

/// Execution counters of one flow node, keyed by state.
///
/// Only the three states the overlay reacts to are kept; any other state
/// the backend reports (`failed`, `executing`, ...) is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowNodeCounters {
    #[serde(default)]
    pub ready: Counter,
    #[serde(default)]
    pub waiting: Counter,
    #[serde(default)]
    pub completed: Counter,
}

impl FlowNodeCounters {
    pub fn new(
        ready: impl Into<Counter>,
        waiting: impl Into<Counter>,
        completed: impl Into<Counter>,
    ) -> Self {
        Self {
            ready: ready.into(),
            waiting: waiting.into(),
            completed: completed.into(),
        }
    }
}

/// Counters-by-display-name for a single instance at one point in time.
///
/// Snapshots are transient: fetched, classified and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstanceStatusSnapshot {
    pub instance_id: InstanceId,
    pub counters: BTreeMap<String, FlowNodeCounters>,
}

impl InstanceStatusSnapshot {
    pub fn new(
        instance_id: impl Into<InstanceId>,
        counters: BTreeMap<String, FlowNodeCounters>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            counters,
        }
    }

    /// Counters reported for `name`, if the node appears in the snapshot.
    pub fn get(&self, name: &str) -> Option<&FlowNodeCounters> {
        self.counters.get(name)
    }

    /// Iterate `(display name, counters)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlowNodeCounters)> {
        self.counters.iter().map(|(name, c)| (name.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
