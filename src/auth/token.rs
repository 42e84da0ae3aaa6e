use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// OAuth token pair held by one session.
///
/// A record is only ever replaced as a whole: the remote service rotates the
/// refresh token on every refresh, so mixing fields from two records would
/// pair an access token with a dead refresh token.
///
/// # Example
/// ```
/// use mowerlink::auth::TokenRecord;
///
/// let record = TokenRecord::new("access", "refresh").with_expires_in(3600);
/// assert!(record.expires_at().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime advertised by the token endpoint; advisory only.
    pub expires_in: Option<u64>,
    pub token_type: Option<String>,
    pub acquired_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_in: None,
            token_type: None,
            acquired_at: Utc::now(),
        }
    }

    pub fn with_expires_in(mut self, secs: u64) -> Self {
        self.expires_in = Some(secs);
        self
    }

    pub fn with_acquired_at(mut self, acquired_at: DateTime<Utc>) -> Self {
        self.acquired_at = acquired_at;
        self
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        Some(self.acquired_at + Duration::seconds(secs))
    }

    /// True when the advertised expiry falls within `grace` of now.
    pub fn expires_within(&self, grace: Duration) -> bool {
        match self.expires_at() {
            Some(expires_at) => Utc::now() >= expires_at - grace,
            None => false,
        }
    }
}

/// Device linked to a session by the first successful device listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceBinding {
    pub device_id: String,
}

impl DeviceBinding {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
        }
    }
}
