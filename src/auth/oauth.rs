//! Token endpoint client for the authorization-code and refresh grants.

use std::fmt;

use chrono::Utc;
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::Deserialize;
use strum::{AsRefStr, Display};

use super::error::AuthError;
use super::token::TokenRecord;

pub const DEFAULT_AUTHORIZE_URL: &str =
    "https://api.authentication.husqvarnagroup.dev/v1/oauth2/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://api.authentication.husqvarnagroup.dev/v1/oauth2/token";
pub const DEFAULT_SCOPE: &str = "iam:read amc:api";

/// Grant types sent to the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

/// Application credential, loaded once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
}

impl Credential {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// OAuth2 endpoints and client registration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub credential: Credential,
    pub redirect_uri: Url,
    pub authorize_url: Url,
    pub token_url: Url,
    pub scope: String,
}

impl OAuthConfig {
    pub fn new(
        credential: Credential,
        redirect_uri: Url,
        authorize_url: Url,
        token_url: Url,
    ) -> Self {
        Self {
            credential,
            redirect_uri,
            authorize_url,
            token_url,
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }
}

/// Client for the remote token endpoint.
///
/// Every request authenticates with HTTP Basic `client_id:client_secret`.
///
/// # Example
/// ```no_run
/// use mowerlink::auth::oauth::{Credential, OAuthClient, OAuthConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = OAuthConfig::new(
///     Credential::new("client-id", "client-secret"),
///     "http://localhost:3000/callback".parse()?,
///     "https://auth.example.com/oauth2/authorize".parse()?,
///     "https://auth.example.com/oauth2/token".parse()?,
/// );
/// let client = OAuthClient::new(config, reqwest::Client::new());
/// let record = client.exchange_code("code-from-callback").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Build the browser redirect URL for the authorization endpoint.
    pub fn authorization_url(&self, state: &str) -> String {
        let mut url = self.config.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.credential.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scope)
            .append_pair("state", state);
        url.into()
    }

    /// Exchange an authorization code from the redirect callback for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenRecord, AuthError> {
        if code.trim().is_empty() {
            return Err(AuthError::InvalidResponse(
                "authorization code is empty".to_string(),
            ));
        }
        self.request_token(
            GrantType::AuthorizationCode,
            &[
                ("grant_type", GrantType::AuthorizationCode.as_ref()),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ],
        )
        .await
    }

    /// Redeem a refresh token. The returned record carries a rotated refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenRecord, AuthError> {
        self.request_token(
            GrantType::RefreshToken,
            &[
                ("grant_type", GrantType::RefreshToken.as_ref()),
                ("refresh_token", refresh_token),
            ],
        )
        .await
    }

    async fn request_token(
        &self,
        grant: GrantType,
        params: &[(&str, &str)],
    ) -> Result<TokenRecord, AuthError> {
        let resp = self
            .http
            .post(self.config.token_url.clone())
            .basic_auth(
                &self.config.credential.client_id,
                Some(&self.config.credential.client_secret),
            )
            .header(ACCEPT, "application/json")
            .form(params)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::warn!(%grant, status = status.as_u16(), "Token endpoint rejected grant");
            return Err(AuthError::Rejected {
                grant,
                status: status.as_u16(),
                body,
            });
        }

        let payload: TokenResponse = serde_json::from_str(&body)?;
        let record = payload.into_record()?;
        tracing::debug!(%grant, expires_in = ?record.expires_in, "Token endpoint issued tokens");
        Ok(record)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_record(self) -> Result<TokenRecord, AuthError> {
        if self.access_token.is_empty() || self.refresh_token.is_empty() {
            return Err(AuthError::InvalidResponse(
                "token response contained an empty token".to_string(),
            ));
        }
        Ok(TokenRecord {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in,
            token_type: self.token_type,
            acquired_at: Utc::now(),
        })
    }
}
