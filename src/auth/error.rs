use thiserror::Error;

use super::oauth::GrantType;

/// Token endpoint and token store failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Token endpoint rejected {grant} grant (status {status}): {body}")]
    Rejected {
        grant: GrantType,
        status: u16,
        body: String,
    },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout calling token endpoint")]
    Timeout,
    #[error("Token store error: {0}")]
    Store(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::InvalidResponse(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidResponse(error.to_string())
    }
}
