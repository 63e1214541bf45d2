//! Domain types shared by the overlay workspace.
//!
//! - [`DiagramDefinition`]: the opaque BPMN document served by the backend.
//! - [`InstanceStatusSnapshot`] / [`FlowNodeCounters`]: per-node execution
//!   counters of one process instance.
//! - [`MarkerState`]: the classification rule turning counters into a
//!   visual marker.
//! - [`DiagramSource`] / [`CaseStatusSource`]: the async fetch seams the
//!   overlay controller drives.

pub mod counters;
pub mod error;
pub mod marker;
pub mod source;
pub mod types;

pub use counters::{Counter, FlowNodeCounters, InstanceStatusSnapshot};
pub use error::FetchError;
pub use marker::{MarkerClasses, MarkerState};
pub use source::{CaseStatusSource, DiagramSource};
pub use types::{DiagramDefinition, ElementId, InstanceId, ProcessId, Timestamp};
