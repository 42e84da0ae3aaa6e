use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde::Deserialize;

use super::error::RemoteError;
use super::model::{Device, DeviceAction, PayloadEnvelope};

pub const DEFAULT_API_BASE_URL: &str = "https://api.amc.husqvarnagroup.dev/v1";
pub const AUTHORIZATION_PROVIDER: &str = "husqvarna";
const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// Thin client for the device list and device action endpoints.
///
/// Callers pass the access token per call; the client never stores tokens.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    envelope: PayloadEnvelope,
}

impl DeviceClient {
    /// `api_key` is sent as `X-Api-Key`; the remote expects the OAuth client id.
    pub fn new(http: reqwest::Client, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.into(),
            envelope: PayloadEnvelope::default(),
        }
    }

    pub fn with_envelope(mut self, envelope: PayloadEnvelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub async fn list_devices(&self, access_token: &str) -> Result<Vec<Device>, RemoteError> {
        let url = self.endpoint(&["mowers"])?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .header("Authorization-Provider", AUTHORIZATION_PROVIDER)
            .header("X-Api-Key", &self.api_key)
            .header(ACCEPT, JSON_API_CONTENT_TYPE)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(RemoteError::from_status(status.as_u16(), body));
        }
        let devices = parse_device_list(&body, self.envelope)?;
        tracing::debug!(count = devices.len(), "Fetched device list");
        Ok(devices)
    }

    /// Fire an action at a device. Completion is not polled.
    pub async fn send_action(
        &self,
        access_token: &str,
        device_id: &str,
        action: DeviceAction,
    ) -> Result<(), RemoteError> {
        let url = self.endpoint(&["mowers", device_id, "actions"])?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .header("Authorization-Provider", AUTHORIZATION_PROVIDER)
            .header("X-Api-Key", &self.api_key)
            .header(CONTENT_TYPE, JSON_API_CONTENT_TYPE)
            .body(action.to_payload().to_string())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::from_status(status.as_u16(), body));
        }
        tracing::info!(device_id, action = action.kind(), "Device action accepted");
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::Network(format!("invalid API base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

fn parse_device_list(body: &str, envelope: PayloadEnvelope) -> Result<Vec<Device>, RemoteError> {
    let devices = match envelope {
        PayloadEnvelope::JsonApi => serde_json::from_str::<DataEnvelope<Vec<Device>>>(body)?.data,
        PayloadEnvelope::Bare => serde_json::from_str(body)?,
    };
    Ok(devices)
}
