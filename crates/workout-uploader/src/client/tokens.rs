use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, UploaderError};
use crate::logging::redact;

/// API application credentials issued by the vendor.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientCredentials {
    pub client_id: u64,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: u64, client_secret: impl Into<String>) -> Self {
        Self {
            client_id,
            client_secret: client_secret.into(),
        }
    }

    /// Validate raw user input. Runs before any network call.
    pub fn parse(client_id: &str, client_secret: &str) -> Result<Self> {
        let client_id = client_id.trim();
        let client_secret = client_secret.trim();

        if client_id.is_empty() {
            return Err(UploaderError::missing("Please enter a Client ID."));
        }
        if client_secret.is_empty() {
            return Err(UploaderError::missing("Please enter a Client Secret."));
        }

        let id = client_id
            .parse::<u64>()
            .map_err(|_| UploaderError::InvalidClientId(client_id.to_string()))?;

        Ok(Self::new(id, client_secret))
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .finish()
    }
}

/// Access/refresh token pair with its absolute expiry.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenState {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl TokenState {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    /// Check if the access token has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Expired once `now` reaches the recorded expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Seconds until expiry, negative once expired.
    pub fn expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }

    /// Returns the Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Body returned by the token endpoint for both grant types.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TryFrom<TokenResponse> for TokenState {
    type Error = UploaderError;

    fn try_from(resp: TokenResponse) -> Result<Self> {
        let expires_at = DateTime::from_timestamp(resp.expires_at, 0).ok_or_else(|| {
            UploaderError::invalid_response(format!("Invalid expires_at: {}", resp.expires_at))
        })?;
        Ok(TokenState::new(resp.access_token, resp.refresh_token, expires_at))
    }
}
