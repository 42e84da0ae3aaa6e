//! Token lifecycle: code exchange, single-flight refresh, and authorized calls.

use std::future::Future;

use chrono::Duration;

use super::error::AuthError;
use super::oauth::OAuthClient;
use super::session::Session;
use super::token::TokenRecord;
use crate::device::RemoteError;
use crate::error::MowerError;

/// Retries allowed after an authorization failure within one call.
const MAX_AUTH_RETRIES: u32 = 1;

/// Orchestrates the token lifecycle for sessions it is handed.
///
/// The manager holds no per-session state. Every operation borrows a
/// [`Session`], reads and writes its token store, and serializes refreshes on
/// the session's refresh gate.
///
/// # Example
/// ```no_run
/// use mowerlink::auth::{OAuthClient, Session, TokenManager};
/// use mowerlink::device::RemoteError;
///
/// # async fn example(oauth: OAuthClient, session: &Session) -> mowerlink::error::Result<()> {
/// let manager = TokenManager::new(oauth);
/// let echoed = manager
///     .call_authorized(session, |token| async move { Ok::<_, RemoteError>(token) })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenManager {
    oauth: OAuthClient,
    proactive_grace: Option<Duration>,
}

impl TokenManager {
    pub fn new(oauth: OAuthClient) -> Self {
        Self {
            oauth,
            proactive_grace: None,
        }
    }

    /// Refresh before calling when the token's advertised expiry is within `grace`.
    pub fn with_proactive_refresh(mut self, grace: Duration) -> Self {
        self.proactive_grace = Some(grace);
        self
    }

    pub fn authorization_url(&self, state: &str) -> String {
        self.oauth.authorization_url(state)
    }

    pub fn is_authenticated(&self, session: &Session) -> bool {
        matches!(session.tokens().load(), Ok(Some(_)))
    }

    /// Exchange an authorization code for a fresh token record.
    pub async fn exchange_authorization_code(&self, code: &str) -> Result<TokenRecord, AuthError> {
        self.oauth.exchange_code(code).await
    }

    /// Exchange `code` and install the resulting record in `session`.
    ///
    /// The record replaces any previous one and drops the device binding. It
    /// is installed under the session's refresh gate, so a refresh already in
    /// flight for the old grant finishes first and cannot overwrite it.
    pub async fn login(&self, session: &Session, code: &str) -> Result<TokenRecord, AuthError> {
        let record = self.exchange_authorization_code(code).await?;
        let _gate = session.refresh_gate().lock().await;
        session.tokens().reset(record.clone())?;
        tracing::info!(session_id = %session.id(), "Session authenticated");
        Ok(record)
    }

    /// Redeem `refresh_token` for a new record. Does not touch any session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenRecord, AuthError> {
        self.oauth.refresh(refresh_token).await
    }

    pub async fn logout(&self, session: &Session) -> Result<(), AuthError> {
        let _gate = session.refresh_gate().lock().await;
        session.tokens().clear()?;
        tracing::info!(session_id = %session.id(), "Session logged out");
        Ok(())
    }

    /// Run `operation` with the session's access token.
    ///
    /// A 401 from the operation triggers one refresh and one retry. A second
    /// 401 is returned as [`MowerError::AuthorizationExpired`]. Any other
    /// failure is returned as [`MowerError::Operation`] without refreshing.
    pub async fn call_authorized<T, F, Fut>(
        &self,
        session: &Session,
        mut operation: F,
    ) -> Result<T, MowerError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let record = session.tokens().load()?.ok_or(AuthError::NotLoggedIn)?;
        let expiring = self
            .proactive_grace
            .is_some_and(|grace| record.expires_within(grace));
        let mut access_token = record.access_token;

        if expiring {
            tracing::debug!(session_id = %session.id(), "Access token near expiry; refreshing first");
            access_token = self.refresh_session(session, &access_token).await?;
        }

        let mut retries = 0;
        loop {
            match operation(access_token.clone()).await {
                Ok(value) => return Ok(value),
                Err(RemoteError::Unauthorized { body }) if retries < MAX_AUTH_RETRIES => {
                    retries += 1;
                    tracing::debug!(
                        session_id = %session.id(),
                        body = %body,
                        "Access token rejected; refreshing"
                    );
                    access_token = self.refresh_session(session, &access_token).await?;
                }
                Err(RemoteError::Unauthorized { body }) => {
                    tracing::warn!(
                        session_id = %session.id(),
                        retries,
                        "Access token rejected after refresh"
                    );
                    return Err(MowerError::AuthorizationExpired { body });
                }
                Err(other) => return Err(MowerError::Operation(other)),
            }
        }
    }

    /// Replace the session's record unless another caller already did.
    ///
    /// `stale_access_token` is the token the caller saw rejected. Holding the
    /// session's refresh gate, the stored record is re-read: if its access
    /// token differs, a concurrent caller has refreshed and its token is
    /// reused. Otherwise the stored refresh token is redeemed exactly once.
    async fn refresh_session(
        &self,
        session: &Session,
        stale_access_token: &str,
    ) -> Result<String, AuthError> {
        let _gate = session.refresh_gate().lock().await;

        let current = session.tokens().load()?.ok_or(AuthError::NotLoggedIn)?;
        if current.access_token != stale_access_token {
            tracing::debug!(session_id = %session.id(), "Reusing token refreshed by a concurrent request");
            return Ok(current.access_token);
        }

        match self.refresh(&current.refresh_token).await {
            Ok(record) => {
                let access_token = record.access_token.clone();
                session.tokens().replace(record)?;
                tracing::info!(session_id = %session.id(), "Session tokens refreshed");
                Ok(access_token)
            }
            Err(err) => {
                tracing::warn!(
                    session_id = %session.id(),
                    error = %err,
                    "Token refresh failed; session is no longer authenticated"
                );
                session.tokens().clear()?;
                Err(err)
            }
        }
    }
}
