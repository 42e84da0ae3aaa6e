use std::sync::{Mutex, MutexGuard};

use super::error::AuthError;
use super::token::{DeviceBinding, TokenRecord};

/// Per-session storage for the token record and device binding.
///
/// Implementations are synchronous; callers never hold a store lock across
/// an await point.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<TokenRecord>, AuthError>;
    /// Swap in `record` as a whole, replacing any previous record.
    fn replace(&self, record: TokenRecord) -> Result<(), AuthError>;
    /// Install `record` for a new grant and drop any device binding, in one step.
    fn reset(&self, record: TokenRecord) -> Result<(), AuthError>;
    /// Drop the record and any device binding.
    fn clear(&self) -> Result<(), AuthError>;
    fn device(&self) -> Result<Option<DeviceBinding>, AuthError>;
    fn bind_device(&self, binding: DeviceBinding) -> Result<(), AuthError>;
    fn unbind_device(&self) -> Result<(), AuthError>;
}

#[derive(Debug, Default)]
struct StoreState {
    record: Option<TokenRecord>,
    device: Option<DeviceBinding>,
}

/// In-memory token store owned by one session.
///
/// # Example
/// ```
/// use mowerlink::auth::{MemoryTokenStore, TokenRecord, TokenStore};
///
/// let store = MemoryTokenStore::new();
/// store.replace(TokenRecord::new("access", "refresh"))?;
/// assert_eq!(store.load()?.unwrap().access_token, "access");
/// # Ok::<(), mowerlink::auth::AuthError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    state: Mutex<StoreState>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: TokenRecord) -> Self {
        Self {
            state: Mutex::new(StoreState {
                record: Some(record),
                device: None,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, AuthError> {
        self.state
            .lock()
            .map_err(|_| AuthError::Store("token store lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<TokenRecord>, AuthError> {
        Ok(self.lock()?.record.clone())
    }

    fn replace(&self, record: TokenRecord) -> Result<(), AuthError> {
        self.lock()?.record = Some(record);
        Ok(())
    }

    fn reset(&self, record: TokenRecord) -> Result<(), AuthError> {
        let mut state = self.lock()?;
        state.record = Some(record);
        state.device = None;
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        let mut state = self.lock()?;
        state.record = None;
        state.device = None;
        Ok(())
    }

    fn device(&self) -> Result<Option<DeviceBinding>, AuthError> {
        Ok(self.lock()?.device.clone())
    }

    fn bind_device(&self, binding: DeviceBinding) -> Result<(), AuthError> {
        self.lock()?.device = Some(binding);
        Ok(())
    }

    fn unbind_device(&self) -> Result<(), AuthError> {
        self.lock()?.device = None;
        Ok(())
    }
}
