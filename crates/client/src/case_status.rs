//! Case status source backed by `GET {base}/caseInfo/{instanceId}`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use overlay_core::{CaseStatusSource, FetchError, FlowNodeCounters, InstanceStatusSnapshot};
use serde::Deserialize;

use crate::api::BpmApi;

/// Wire shape of the `caseInfo` response. Only the counters are read.
#[derive(Debug, Deserialize)]
struct CaseInfo {
    #[serde(rename = "flowNodeStatesCounters")]
    flow_node_states_counters: BTreeMap<String, FlowNodeCounters>,
}

/// Fetches per-node execution counters of one case.
#[derive(Debug, Clone)]
pub struct CaseStatusClient {
    api: BpmApi,
}

impl CaseStatusClient {
    pub fn new(api: BpmApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CaseStatusSource for CaseStatusClient {
    async fn load(&self, instance_id: &str) -> Result<InstanceStatusSnapshot, FetchError> {
        let url = self.api.case_info_url(instance_id)?;
        tracing::debug!(instance_id, url = %url, "Fetching case info");

        let info: CaseInfo = self.api.get_json(&url).await?;
        tracing::debug!(
            instance_id,
            nodes = info.flow_node_states_counters.len(),
            "Case info fetched",
        );

        Ok(InstanceStatusSnapshot::new(
            instance_id,
            info.flow_node_states_counters,
        ))
    }
}
