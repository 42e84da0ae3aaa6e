use std::sync::Arc;

use super::client::DeviceClient;
use super::model::{DeviceAction, DeviceListing, DeviceSummary};
use crate::auth::{DeviceBinding, Session, TokenManager};
use crate::error::MowerError;

/// Device operations used by route handlers, each run through
/// [`TokenManager::call_authorized`].
#[derive(Debug, Clone)]
pub struct DeviceService {
    manager: Arc<TokenManager>,
    client: DeviceClient,
}

impl DeviceService {
    pub fn new(manager: Arc<TokenManager>, client: DeviceClient) -> Self {
        Self { manager, client }
    }

    pub fn manager(&self) -> &TokenManager {
        &self.manager
    }

    /// Fetch the first linked device and bind it to the session.
    ///
    /// An empty listing drops any earlier binding.
    pub async fn list_devices(&self, session: &Session) -> Result<DeviceListing, MowerError> {
        let client = &self.client;
        let devices = self
            .manager
            .call_authorized(session, |token| async move { client.list_devices(&token).await })
            .await?;

        let Some(first) = devices.into_iter().next() else {
            tracing::info!(session_id = %session.id(), "No devices linked to account");
            session.tokens().unbind_device()?;
            return Ok(DeviceListing::NoDevices);
        };
        let summary = DeviceSummary::from(first);
        session
            .tokens()
            .bind_device(DeviceBinding::new(summary.id.clone()))?;
        Ok(DeviceListing::Found(summary))
    }

    pub async fn send_action(
        &self,
        session: &Session,
        device_id: &str,
        action: DeviceAction,
    ) -> Result<(), MowerError> {
        let client = &self.client;
        self.manager
            .call_authorized(session, |token| async move {
                client.send_action(&token, device_id, action).await
            })
            .await
    }

    /// Send `action` to the device bound by an earlier [`list_devices`](Self::list_devices).
    pub async fn act_on_bound_device(
        &self,
        session: &Session,
        action: DeviceAction,
    ) -> Result<(), MowerError> {
        let binding = session.tokens().device()?.ok_or_else(|| {
            MowerError::ClientState("no device bound to this session".to_string())
        })?;
        self.send_action(session, &binding.device_id, action).await
    }
}
