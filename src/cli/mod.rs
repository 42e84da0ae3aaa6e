//! Command-line and environment surface for the server binary.

use std::net::IpAddr;

use clap::Parser;
use reqwest::Url;

use crate::auth::oauth::{DEFAULT_AUTHORIZE_URL, DEFAULT_SCOPE, DEFAULT_TOKEN_URL};
use crate::auth::session::{DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_SESSIONS};
use crate::device::client::DEFAULT_API_BASE_URL;
use crate::device::PayloadEnvelope;
use crate::http::DEFAULT_TIMEOUT;

/// Automower Connect dashboard server
#[derive(Parser, Debug)]
#[command(name = "mowerlink", version, about = "Automower Connect dashboard server")]
pub struct Cli {
    /// OAuth client id (also sent as the device API key)
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: String,

    /// OAuth client secret
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Redirect URI registered with the authorization server
    #[arg(long, env = "REDIRECT_URI")]
    pub redirect_uri: Url,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: IpAddr,

    #[arg(long, env = "AUTHORIZE_URL", default_value = DEFAULT_AUTHORIZE_URL)]
    pub authorize_url: Url,

    #[arg(long, env = "TOKEN_URL", default_value = DEFAULT_TOKEN_URL)]
    pub token_url: Url,

    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: Url,

    /// Space-separated OAuth scopes
    #[arg(long, env = "OAUTH_SCOPE", default_value = DEFAULT_SCOPE)]
    pub scope: String,

    /// Timeout in seconds for every outbound request
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub http_timeout_secs: u64,

    /// Device list payload shape (json-api or bare)
    #[arg(long, env = "DEVICE_PAYLOAD_ENVELOPE", default_value = "json-api")]
    pub envelope: PayloadEnvelope,

    /// Refresh tokens this many seconds before their advertised expiry
    #[arg(long, env = "PROACTIVE_REFRESH_SECS")]
    pub proactive_refresh_secs: Option<u64>,

    /// Mark the session cookie Secure (use behind HTTPS)
    #[arg(long, env = "SECURE_COOKIES")]
    pub secure_cookies: bool,

    /// Drop sessions unused for this many seconds
    #[arg(long, env = "SESSION_IDLE_SECS", default_value_t = DEFAULT_IDLE_TIMEOUT_SECS.unsigned_abs())]
    pub session_idle_secs: u64,

    /// Maximum number of live sessions
    #[arg(long, env = "MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    pub max_sessions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 7] = [
        "mowerlink",
        "--client-id",
        "id",
        "--client-secret",
        "secret",
        "--redirect-uri",
        "http://localhost:3000/callback",
    ];

    #[test]
    fn parse_with_defaults() {
        let cli = Cli::try_parse_from(REQUIRED).unwrap();
        assert_eq!(cli.client_id, "id");
        assert_eq!(cli.token_url.as_str(), DEFAULT_TOKEN_URL);
        assert_eq!(cli.envelope, PayloadEnvelope::JsonApi);
        assert_eq!(cli.http_timeout_secs, DEFAULT_TIMEOUT.as_secs());
        assert_eq!(cli.session_idle_secs, 86_400);
        assert_eq!(cli.max_sessions, DEFAULT_MAX_SESSIONS);
        assert!(cli.proactive_refresh_secs.is_none());
        assert!(!cli.secure_cookies);
    }

    #[test]
    fn parse_with_overrides() {
        let mut args = REQUIRED.to_vec();
        args.extend([
            "--port",
            "8080",
            "--envelope",
            "bare",
            "--proactive-refresh-secs",
            "60",
            "--secure-cookies",
        ]);
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.port, 8080);
        assert_eq!(cli.envelope, PayloadEnvelope::Bare);
        assert_eq!(cli.proactive_refresh_secs, Some(60));
        assert!(cli.secure_cookies);
    }

    #[test]
    fn invalid_redirect_uri_is_error() {
        let mut args = REQUIRED.to_vec();
        args[6] = "not a url";
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn unknown_envelope_is_error() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--envelope", "xml"]);
        assert!(Cli::try_parse_from(args).is_err());
    }
}
