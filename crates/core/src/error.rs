use serde::Serialize;

/// Errors from fetching a document or snapshot from the backend.
///
/// Every variant carries the URL that was requested so callers can tell a
/// diagram failure from a per-instance status failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    /// The backend answered with a non-2xx status code.
    #[error("Unable to fetch {url}: HTTP {status}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The request never produced a response (network, DNS, TLS, timeout).
    #[error("Unable to fetch {url}: {message}")]
    Transport { url: String, message: String },

    /// The response body could not be decoded.
    #[error("Malformed response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// URL of the failed request.
    pub fn url(&self) -> &str {
        match self {
            Self::Remote { url, .. } | Self::Transport { url, .. } | Self::Decode { url, .. } => {
                url
            }
        }
    }

    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
