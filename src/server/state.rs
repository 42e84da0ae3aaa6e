use std::sync::Arc;

use crate::auth::{OAuthClient, SessionRegistry, TokenManager};
use crate::config::AppConfig;
use crate::device::{DeviceClient, DeviceService};
use crate::error::MowerError;
use crate::http::build_client;

/// Shared state for route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub(super) devices: DeviceService,
    pub(super) sessions: Arc<SessionRegistry>,
    pub(super) secure_cookies: bool,
}

impl AppState {
    pub fn new(devices: DeviceService, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            devices,
            sessions,
            secure_cookies: false,
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Wire the token manager and device client from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, MowerError> {
        let http = build_client(config.http_timeout)
            .map_err(|e| MowerError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let mut manager = TokenManager::new(OAuthClient::new(config.oauth.clone(), http.clone()));
        if let Some(grace) = config.proactive_refresh {
            manager = manager.with_proactive_refresh(grace);
        }
        let client = DeviceClient::new(
            http,
            config.api_base_url.clone(),
            config.oauth.credential.client_id.clone(),
        )
        .with_envelope(config.envelope);

        let devices = DeviceService::new(Arc::new(manager), client);
        let sessions = SessionRegistry::new()
            .with_idle_timeout(config.session_idle_timeout)
            .with_max_sessions(config.max_sessions);
        Ok(Self::new(devices, Arc::new(sessions))
            .with_secure_cookies(config.secure_cookies))
    }

    pub fn manager(&self) -> &TokenManager {
        self.devices.manager()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}
