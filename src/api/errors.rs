use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the moodle web service
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid token: moodle rejected the provided token")]
    InvalidToken,
    #[error("Unauthorized request to {url}")]
    Unauthorized { url: String },
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Moodle returned an error ({errorcode}): {message}")]
    Moodle { errorcode: String, message: String },
    #[error("Response of {url} is not valid json: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Whether the failure means the credentials were not accepted
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::InvalidToken | ApiError::Unauthorized { .. })
    }
}
