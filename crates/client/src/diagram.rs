//! Diagram source backed by `GET {base}/diagram/{processId}`.

use async_trait::async_trait;
use overlay_core::{DiagramDefinition, DiagramSource, FetchError};

use crate::api::BpmApi;

/// Fetches raw BPMN documents. The body is returned unparsed.
#[derive(Debug, Clone)]
pub struct DiagramSourceClient {
    api: BpmApi,
}

impl DiagramSourceClient {
    pub fn new(api: BpmApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DiagramSource for DiagramSourceClient {
    async fn load(&self, process_id: &str) -> Result<DiagramDefinition, FetchError> {
        let url = self.api.diagram_url(process_id)?;
        tracing::debug!(process_id, url = %url, "Fetching BPMN content");

        let body = self.api.get_text(&url).await?;
        tracing::debug!(process_id, bytes = body.len(), "BPMN content fetched");

        Ok(DiagramDefinition::new(process_id, url, body))
    }
}
