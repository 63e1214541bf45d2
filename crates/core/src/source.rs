//! Async fetch seams driven by the overlay controller.
//!
//! The HTTP implementations live in `overlay-client`; tests substitute
//! in-memory fakes.

use async_trait::async_trait;

use crate::counters::InstanceStatusSnapshot;
use crate::error::FetchError;
use crate::types::DiagramDefinition;

/// Loads diagram definitions by process identifier.
#[async_trait]
pub trait DiagramSource: Send + Sync {
    /// Fetch the diagram of `process_id`. Fails on any non-success
    /// response; never retries.
    async fn load(&self, process_id: &str) -> Result<DiagramDefinition, FetchError>;
}

/// Loads per-node status snapshots by process instance identifier.
#[async_trait]
pub trait CaseStatusSource: Send + Sync {
    /// Fetch the current counters of `instance_id`. Fails on any
    /// non-success response; never retries.
    async fn load(&self, instance_id: &str) -> Result<InstanceStatusSnapshot, FetchError>;
}
