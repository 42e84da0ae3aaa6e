#![allow(dead_code)]

use std::sync::Arc;

use mowerlink::auth::{
    Credential, MemoryTokenStore, OAuthClient, OAuthConfig, Session, TokenManager, TokenRecord,
};
use mowerlink::device::{DeviceClient, DeviceService, PayloadEnvelope};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "client-abc";
pub const CLIENT_SECRET: &str = "secret-xyz";
pub const REDIRECT_URI: &str = "http://localhost:3000/callback";

pub fn oauth_config(server: &MockServer) -> OAuthConfig {
    OAuthConfig::new(
        Credential::new(CLIENT_ID, CLIENT_SECRET),
        REDIRECT_URI.parse().unwrap(),
        format!("{}/oauth2/authorize", server.uri()).parse().unwrap(),
        format!("{}/oauth2/token", server.uri()).parse().unwrap(),
    )
}

pub fn manager(server: &MockServer) -> TokenManager {
    TokenManager::new(OAuthClient::new(oauth_config(server), reqwest::Client::new()))
}

pub fn device_client(server: &MockServer) -> DeviceClient {
    DeviceClient::new(
        reqwest::Client::new(),
        format!("{}/v1", server.uri()).parse().unwrap(),
        CLIENT_ID,
    )
}

pub fn device_service(server: &MockServer) -> DeviceService {
    DeviceService::new(Arc::new(manager(server)), device_client(server))
}

pub fn bare_device_service(server: &MockServer) -> DeviceService {
    DeviceService::new(
        Arc::new(manager(server)),
        device_client(server).with_envelope(PayloadEnvelope::Bare),
    )
}

pub fn session_with(access: &str, refresh: &str) -> Session {
    Session::new(Arc::new(MemoryTokenStore::with_record(TokenRecord::new(
        access, refresh,
    ))))
}

pub fn token_body(access: &str, refresh: &str) -> serde_json::Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": 3600,
        "token_type": "Bearer"
    })
}

/// Token endpoint that redeems `refresh` for a new pair, expected `times` times.
pub async fn mount_refresh(
    server: &MockServer,
    refresh: &str,
    new_access: &str,
    new_refresh: &str,
    times: u64,
) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains(format!("refresh_token={refresh}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(new_access, new_refresh)))
        .expect(times)
        .mount(server)
        .await;
}

pub fn mower_json(id: &str, name: &str, activity: &str, battery: u8) -> serde_json::Value {
    json!({
        "type": "mower",
        "id": id,
        "attributes": {
            "system": { "name": name, "model": "450X" },
            "mower": { "activity": activity, "state": "IN_OPERATION" },
            "battery": { "batteryPercent": battery }
        }
    })
}
