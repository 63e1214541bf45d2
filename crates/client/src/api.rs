//! REST wrapper for the BPM API endpoints.
//!
//! Builds request URLs from a base API URL and maps every response that
//! is not a 2xx into [`FetchError::Remote`]. No retry happens here.

use std::time::Duration;

use overlay_core::FetchError;

/// HTTP client for one BPM backend.
#[derive(Debug, Clone)]
pub struct BpmApi {
    client: reqwest::Client,
    api_url: String,
}

impl BpmApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base API URL, e.g. `http://host:8080/bonita/API/bpm`.
    ///   A trailing slash is ignored.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client whose requests time out after `timeout`.
    pub fn with_timeout(
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let api_url = api_url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: api_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    /// Base API URL without trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// `{base}/diagram/{process_id}`, with the id percent-encoded as one
    /// path segment.
    pub fn diagram_url(&self, process_id: &str) -> Result<String, FetchError> {
        self.resource_url("diagram", process_id)
    }

    /// `{base}/caseInfo/{instance_id}`, with the id percent-encoded as one
    /// path segment.
    pub fn case_info_url(&self, instance_id: &str) -> Result<String, FetchError> {
        self.resource_url("caseInfo", instance_id)
    }

    /// `GET url` and return the body text of a successful response.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url = %url, "Fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(url, &e))?;

        let response = Self::ensure_success(url, response)?;
        response.text().await.map_err(|e| transport(url, &e))
    }

    /// `GET url` and decode a successful JSON response body.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, FetchError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    // ---- private helpers ----

    fn resource_url(&self, resource: &str, id: &str) -> Result<String, FetchError> {
        let invalid = |message: String| FetchError::Transport {
            url: format!("{}/{}/{}", self.api_url, resource, id),
            message,
        };

        let mut url = reqwest::Url::parse(&self.api_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(resource)
            .push(id);
        Ok(url.to_string())
    }

    /// Reject any non-2xx response with [`FetchError::Remote`].
    fn ensure_success(
        url: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                "Backend returned an error status",
            );
            return Err(FetchError::Remote {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

fn transport(url: &str, err: &reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        message: err.to_string(),
    }
}
