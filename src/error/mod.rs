//! Error types for mowerlink.

use thiserror::Error;

use crate::auth::AuthError;
use crate::device::RemoteError;

/// Coarse classification used by the route layer to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Session must go back through the login flow.
    Authentication,
    /// The remote call failed for a reason re-authenticating would not fix.
    Operation,
    /// Session is missing state the request depends on.
    ClientState,
    Configuration,
    Unknown,
}

/// Primary error type for all authorized operations.
#[derive(Error, Debug)]
pub enum MowerError {
    #[error("Reauthentication required: {0}")]
    ReauthenticationRequired(#[source] AuthError),

    #[error("Authorization rejected after token refresh: {body}")]
    AuthorizationExpired { body: String },

    #[error("Operation failed: {0}")]
    Operation(#[source] RemoteError),

    #[error("Invalid session state: {0}")]
    ClientState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MowerError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ReauthenticationRequired(_) | Self::AuthorizationExpired { .. } => {
                ErrorCategory::Authentication
            }
            Self::Operation(_) => ErrorCategory::Operation,
            Self::ClientState(_) => ErrorCategory::ClientState,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether the caller should send the user back to the login entry point.
    pub fn requires_login(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Authentication | ErrorCategory::ClientState
        )
    }
}

impl From<AuthError> for MowerError {
    fn from(error: AuthError) -> Self {
        Self::ReauthenticationRequired(error)
    }
}

impl From<RemoteError> for MowerError {
    fn from(error: RemoteError) -> Self {
        match error {
            RemoteError::Unauthorized { body } => Self::AuthorizationExpired { body },
            other => Self::Operation(other),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, MowerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_require_login() {
        let err = MowerError::from(AuthError::NotLoggedIn);
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert!(err.requires_login());
    }

    #[test]
    fn client_state_requires_login() {
        let err = MowerError::ClientState("no device bound".to_string());
        assert!(err.requires_login());
    }

    #[test]
    fn server_errors_do_not_require_login() {
        let err = MowerError::from(RemoteError::Api {
            status: 500,
            body: "boom".to_string(),
        });
        assert_eq!(err.category(), ErrorCategory::Operation);
        assert!(!err.requires_login());
    }

    #[test]
    fn forbidden_is_an_operation_failure() {
        let err = MowerError::from(RemoteError::Api {
            status: 403,
            body: "forbidden".to_string(),
        });
        assert!(matches!(err, MowerError::Operation(_)));
    }

    #[test]
    fn unauthorized_converts_to_authorization_expired() {
        let err = MowerError::from(RemoteError::Unauthorized {
            body: "expired".to_string(),
        });
        assert!(matches!(err, MowerError::AuthorizationExpired { ref body } if body == "expired"));
    }
}
