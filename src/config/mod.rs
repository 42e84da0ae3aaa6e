//! Server configuration (layered: CLI flags > env > `.env` file > defaults).

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use crate::auth::{Credential, OAuthConfig};
use crate::cli::Cli;
use crate::device::PayloadEnvelope;
use crate::error::MowerError;

/// Validated configuration for one server process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub oauth: OAuthConfig,
    pub api_base_url: Url,
    pub listen_addr: SocketAddr,
    pub http_timeout: Duration,
    pub envelope: PayloadEnvelope,
    pub proactive_refresh: Option<chrono::Duration>,
    pub secure_cookies: bool,
    pub session_idle_timeout: chrono::Duration,
    pub max_sessions: usize,
}

impl AppConfig {
    /// Load `.env` if present, then parse flags and environment.
    pub fn load() -> Result<Self, MowerError> {
        let _ = dotenvy::dotenv();
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Result<Self, MowerError> {
        if cli.client_id.trim().is_empty() || cli.client_secret.trim().is_empty() {
            return Err(MowerError::Configuration(
                "client id and client secret must not be empty".to_string(),
            ));
        }
        for (name, url) in [
            ("redirect URI", &cli.redirect_uri),
            ("authorize URL", &cli.authorize_url),
            ("token URL", &cli.token_url),
            ("API base URL", &cli.api_base_url),
        ] {
            require_http(name, url)?;
        }
        if cli.http_timeout_secs == 0 {
            return Err(MowerError::Configuration(
                "HTTP timeout must be at least one second".to_string(),
            ));
        }
        let proactive_refresh = cli
            .proactive_refresh_secs
            .map(|secs| {
                i64::try_from(secs).map(chrono::Duration::seconds).map_err(|_| {
                    MowerError::Configuration(format!("proactive refresh of {secs}s is too large"))
                })
            })
            .transpose()?;
        if cli.max_sessions == 0 {
            return Err(MowerError::Configuration(
                "max sessions must be at least one".to_string(),
            ));
        }
        let session_idle_timeout = i64::try_from(cli.session_idle_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(chrono::Duration::seconds)
            .ok_or_else(|| {
                MowerError::Configuration(format!(
                    "session idle timeout of {}s is out of range",
                    cli.session_idle_secs
                ))
            })?;

        let oauth = OAuthConfig::new(
            Credential::new(cli.client_id, cli.client_secret),
            cli.redirect_uri,
            cli.authorize_url,
            cli.token_url,
        )
        .with_scope(cli.scope);

        Ok(Self {
            oauth,
            api_base_url: cli.api_base_url,
            listen_addr: SocketAddr::new(cli.bind_address, cli.port),
            http_timeout: Duration::from_secs(cli.http_timeout_secs),
            envelope: cli.envelope,
            proactive_refresh,
            secure_cookies: cli.secure_cookies,
            session_idle_timeout,
            max_sessions: cli.max_sessions,
        })
    }
}

fn require_http(name: &str, url: &Url) -> Result<(), MowerError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(MowerError::Configuration(format!(
            "{name} must use http or https, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(extra: &[&str]) -> Cli {
        let mut args = vec![
            "mowerlink",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--redirect-uri",
            "http://localhost:3000/callback",
            "--port",
            "3000",
        ];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn from_cli_builds_oauth_config() {
        let config = AppConfig::from_cli(cli(&[])).unwrap();
        assert_eq!(config.oauth.credential.client_id, "id");
        assert_eq!(config.oauth.redirect_uri.as_str(), "http://localhost:3000/callback");
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert!(config.proactive_refresh.is_none());
    }

    #[test]
    fn proactive_refresh_converts_to_duration() {
        let config = AppConfig::from_cli(cli(&["--proactive-refresh-secs", "120"])).unwrap();
        assert_eq!(config.proactive_refresh, Some(chrono::Duration::seconds(120)));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut parsed = cli(&[]);
        parsed.client_secret = "  ".to_string();
        assert!(matches!(
            AppConfig::from_cli(parsed),
            Err(MowerError::Configuration(_))
        ));
    }

    #[test]
    fn non_http_token_url_is_rejected() {
        let result = AppConfig::from_cli(cli(&["--token-url", "ftp://example.com/token"]));
        assert!(matches!(result, Err(MowerError::Configuration(msg)) if msg.contains("token URL")));
    }

    #[test]
    fn session_limits_are_validated() {
        let config = AppConfig::from_cli(cli(&["--session-idle-secs", "600", "--max-sessions", "50"]))
            .unwrap();
        assert_eq!(config.session_idle_timeout, chrono::Duration::seconds(600));
        assert_eq!(config.max_sessions, 50);

        assert!(AppConfig::from_cli(cli(&["--session-idle-secs", "0"])).is_err());
        assert!(AppConfig::from_cli(cli(&["--max-sessions", "0"])).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = AppConfig::from_cli(cli(&["--http-timeout-secs", "0"]));
        assert!(result.is_err());
    }
}
