use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::state::AppState;
use crate::auth::{AuthError, Session, SessionId};

pub const SESSION_COOKIE_NAME: &str = "mowerlink_session";

/// Session cookie carrying the opaque session id.
pub(super) fn session_cookie(id: SessionId, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, id.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

pub(super) fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build()
}

/// Session named by the request's cookie, if the server still knows it.
pub(super) fn current_session(state: &AppState, jar: &CookieJar) -> Option<Arc<Session>> {
    let id = jar
        .get(SESSION_COOKIE_NAME)?
        .value()
        .parse::<SessionId>()
        .ok()?;
    state.sessions().get(id)
}

/// Current session, or a new one with its cookie added to the jar.
pub(super) fn session_or_create(
    state: &AppState,
    jar: CookieJar,
) -> Result<(CookieJar, Arc<Session>), AuthError> {
    if let Some(session) = current_session(state, &jar) {
        return Ok((jar, session));
    }
    let session = state.sessions().create()?;
    let jar = jar.add(session_cookie(session.id(), state.secure_cookies));
    Ok((jar, session))
}
