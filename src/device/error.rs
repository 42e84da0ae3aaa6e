use thiserror::Error;

/// Failures from the remote device API.
///
/// Only [`RemoteError::Unauthorized`] is treated as evidence that the access
/// token needs refreshing.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Unauthorized (status 401): {body}")]
    Unauthorized { body: String },
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout calling device API")]
    Timeout,
    #[error("Malformed payload: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => Self::Unauthorized { body },
            _ => Self::Api { status, body },
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}
