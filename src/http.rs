//! Shared outbound HTTP client.

use std::time::Duration;

/// Bound on every call to the remote service.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Build the client shared by the token endpoint and device API calls.
///
/// `timeout` covers the whole request, connect through body; a request that
/// exceeds it fails with an error whose `is_timeout()` is true.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .pool_max_idle_per_host(10)
        .user_agent(concat!("mowerlink/", env!("CARGO_PKG_VERSION")))
        .build()
}
