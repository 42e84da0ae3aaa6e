//! OAuth2 authorization-code login, token storage, and the token lifecycle.

pub mod error;
pub mod manager;
pub mod oauth;
pub mod session;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use manager::TokenManager;
pub use oauth::{Credential, GrantType, OAuthClient, OAuthConfig};
pub use session::{
    Session, SessionId, SessionRegistry, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_SESSIONS,
};
pub use store::{MemoryTokenStore, TokenStore};
pub use token::{DeviceBinding, TokenRecord};
