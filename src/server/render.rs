//! HTML pages. Remote-provided text is always escaped.

use crate::auth::AuthError;
use crate::device::DeviceSummary;
use crate::device::model::DEFAULT_START_MINUTES;
use crate::error::MowerError;

const TITLE: &str = "Automower Connect Dashboard";

fn page(body: &str) -> String {
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{TITLE}</title></head>\n<body>\n{body}\n</body></html>\n"
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn index(authenticated: bool) -> String {
    let link = if authenticated {
        r#"<a href="/dashboard">Open dashboard</a> | <a href="/logout">Log out</a>"#
    } else {
        r#"<a href="/login">Login with Automower Connect</a>"#
    };
    page(&format!("<h2>{TITLE}</h2>\n<p>{link}</p>"))
}

pub fn dashboard(device: &DeviceSummary) -> String {
    page(&format!(
        r#"<h2>Welcome to Automower Dashboard</h2>
<p><strong>Name:</strong> {name}</p>
<p><strong>Status:</strong> {activity}</p>
<p><strong>Battery:</strong> {battery}%</p>
<form method="POST" action="/start">
  <input type="hidden" name="duration" value="{minutes}">
  <button type="submit">Start Mowing ({minutes} min)</button>
</form>
<form method="POST" action="/park">
  <button type="submit">Park Mower</button>
</form>
<p><a href="/logout">Log out</a></p>"#,
        name = escape_html(&device.name),
        activity = escape_html(&device.activity),
        battery = device.battery_percent,
        minutes = DEFAULT_START_MINUTES,
    ))
}

pub fn no_devices() -> String {
    page("<p>No mowers linked to your account.</p>")
}

pub fn message(text: &str) -> String {
    page(&format!(
        "<p>{}</p>\n<p><a href=\"/\">Back</a></p>",
        escape_html(text)
    ))
}

/// Token exchange failure, with the remote status and body when available.
pub fn auth_failure(error: &AuthError) -> String {
    let detail = match error {
        AuthError::Rejected { status, body, .. } => format!("status {status}\n{body}"),
        other => other.to_string(),
    };
    page(&format!(
        "<p>Token exchange failed:</p>\n<pre>{}</pre>\n<p><a href=\"/login\">Try again</a></p>",
        escape_html(&detail)
    ))
}

pub fn operation_failure(error: &MowerError) -> String {
    page(&format!(
        "<p>Error talking to the mower service:</p>\n<pre>{}</pre>\n<p><a href=\"/dashboard\">Retry</a></p>",
        escape_html(&error.to_string())
    ))
}
