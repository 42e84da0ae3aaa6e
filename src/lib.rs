//! mowerlink: a small web dashboard for Automower Connect robotic mowers.
//!
//! A browser logs in through the OAuth2 authorization-code flow, after which
//! the server lists the account's mower and forwards start and park commands.
//! Every device call goes through [`auth::TokenManager::call_authorized`],
//! which refreshes an expired access token at most once per call and
//! serializes concurrent refreshes for the same session.
//!
//! # Quick Start
//!
//! ```no_run
//! use mowerlink::config::AppConfig;
//!
//! # async fn example() -> mowerlink::error::Result<()> {
//! let config = AppConfig::load()?;
//! mowerlink::server::serve(config).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod http;
pub mod prelude;
pub mod server;
