//! Convenience re-exports for common use.

pub use crate::auth::{
    AuthError, MemoryTokenStore, Session, SessionId, SessionRegistry, TokenManager, TokenRecord,
    TokenStore,
};
pub use crate::config::AppConfig;
pub use crate::device::{DeviceAction, DeviceListing, DeviceService, DeviceSummary, RemoteError};
pub use crate::error::{ErrorCategory, MowerError, Result};
