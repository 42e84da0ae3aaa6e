use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use super::cookies;
use super::render;
use super::state::AppState;
use crate::device::model::DEFAULT_START_MINUTES;
use crate::device::{DeviceAction, DeviceListing};
use crate::error::MowerError;

// ── Landing ────────────────────────────────────────────────────────

pub(super) async fn index(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let authenticated = cookies::current_session(&state, &jar)
        .is_some_and(|session| state.manager().is_authenticated(&session));
    Html(render::index(authenticated))
}

// ── Login ──────────────────────────────────────────────────────────

pub(super) async fn login(State(state): State<AppState>, jar: CookieJar) -> Response {
    let csrf_state = Uuid::new_v4().simple().to_string();
    let started = cookies::session_or_create(&state, jar).and_then(|(jar, session)| {
        session.begin_login(csrf_state.as_str())?;
        Ok((jar, session))
    });
    let (jar, session) = match started {
        Ok(started) => started,
        Err(err) => {
            tracing::error!(error = %err, "Could not start a login session");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::message("Could not start a login session; please try again.")),
            )
                .into_response();
        }
    };
    let url = state.manager().authorization_url(&csrf_state);
    tracing::debug!(session_id = %session.id(), "Redirecting to authorization endpoint");
    (jar, Redirect::to(&url)).into_response()
}

// ── Callback ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

pub(super) async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(error) = &params.error {
        let desc = params.error_description.as_deref().unwrap_or(error);
        tracing::warn!(error = %error, description = %desc, "Authorization server returned an error");
        return (
            StatusCode::BAD_REQUEST,
            Html(render::message(&format!("Authorization failed: {desc}"))),
        )
            .into_response();
    }

    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        return (StatusCode::BAD_REQUEST, Html(render::message("No code received"))).into_response();
    };

    let Some(session) = cookies::current_session(&state, &jar) else {
        tracing::warn!("Callback without a known session");
        return Redirect::to("/login").into_response();
    };

    if !session.finish_login(params.state.as_deref()) {
        tracing::warn!(session_id = %session.id(), "OAuth state mismatch");
        return (
            StatusCode::BAD_REQUEST,
            Html(render::message("Login state mismatch; please log in again.")),
        )
            .into_response();
    }

    match state.manager().login(&session, &code).await {
        Ok(_) => Redirect::to("/dashboard").into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Token exchange failed");
            (StatusCode::BAD_GATEWAY, Html(render::auth_failure(&err))).into_response()
        }
    }
}

// ── Dashboard ──────────────────────────────────────────────────────

pub(super) async fn dashboard(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(session) = cookies::current_session(&state, &jar)
        .filter(|session| state.manager().is_authenticated(session))
    else {
        return Redirect::to("/").into_response();
    };

    match state.devices.list_devices(&session).await {
        Ok(DeviceListing::Found(device)) => Html(render::dashboard(&device)).into_response(),
        Ok(DeviceListing::NoDevices) => Html(render::no_devices()).into_response(),
        Err(err) => failure_response(err),
    }
}

// ── Actions ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub(super) struct StartForm {
    duration: Option<String>,
}

pub(super) async fn start(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<StartForm>,
) -> Response {
    let duration_minutes = form
        .duration
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|minutes| *minutes > 0)
        .unwrap_or(DEFAULT_START_MINUTES);
    act(&state, &jar, DeviceAction::Start { duration_minutes }).await
}

pub(super) async fn park(State(state): State<AppState>, jar: CookieJar) -> Response {
    act(&state, &jar, DeviceAction::Park).await
}

async fn act(state: &AppState, jar: &CookieJar, action: DeviceAction) -> Response {
    let Some(session) = cookies::current_session(state, jar) else {
        return Redirect::to("/").into_response();
    };
    match state.devices.act_on_bound_device(&session, action).await {
        Ok(()) => Redirect::to("/dashboard").into_response(),
        Err(err) => failure_response(err),
    }
}

// ── Logout ─────────────────────────────────────────────────────────

pub(super) async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(session) = cookies::current_session(&state, &jar) {
        if let Err(e) = state.manager().logout(&session).await {
            tracing::warn!(error = %e, "Clearing tokens failed during logout");
        }
        state.sessions().remove(session.id());
    }
    (jar.remove(cookies::clear_session_cookie()), Redirect::to("/"))
}

fn failure_response(err: MowerError) -> Response {
    if err.requires_login() {
        tracing::warn!(error = %err, "Session needs to log in again");
        return Redirect::to("/login").into_response();
    }
    tracing::error!(error = %err, "Device operation failed");
    (StatusCode::BAD_GATEWAY, Html(render::operation_failure(&err))).into_response()
}
