//! Strava OAuth2 token endpoint
//!
//! Exchanges an authorization code for a token pair and refreshes expired
//! access tokens. Both grants post a form body and succeed only on HTTP 200.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::client::tokens::{ClientCredentials, TokenResponse, TokenState};
use crate::error::{Result, UploaderError};
use crate::logging::redact;

/// Default OAuth host
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://www.strava.com";

/// Scope needed to create activities
const ACTIVITY_WRITE_SCOPE: &str = "activity:write";

/// Grant requested from the token endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::RefreshToken => "refresh_token",
        }
    }

    /// Form field carrying the grant's secret value
    fn value_field(&self) -> &'static str {
        match self {
            GrantType::AuthorizationCode => "code",
            GrantType::RefreshToken => "refresh_token",
        }
    }
}

/// Client for the token endpoint
pub struct OAuthClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    debug: bool,
}

impl OAuthClient {
    /// Create a client for the public Strava host
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::new_with_base_url(DEFAULT_OAUTH_BASE_URL, timeout)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn new_with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(UploaderError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            debug: false,
        })
    }

    /// Log redacted request and token details
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url)
    }

    /// Build the URL the user opens to grant access. `state` carries the temp-key.
    pub fn authorize_url(
        &self,
        client_id: u64,
        redirect_uri: &str,
        state: &str,
    ) -> Result<Url> {
        let base = format!("{}/oauth/authorize", self.base_url);
        let client_id = client_id.to_string();
        Url::parse_with_params(
            &base,
            &[
                ("client_id", client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri),
                ("approval_prompt", "force"),
                ("scope", ACTIVITY_WRITE_SCOPE),
                ("state", state),
            ],
        )
        .map_err(|e| UploaderError::config(format!("Invalid authorize URL: {}", e)))
    }

    /// Exchange an authorization code for a token pair
    pub async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
    ) -> Result<TokenState> {
        if code.trim().is_empty() {
            return Err(UploaderError::missing("Authorization code is empty."));
        }
        self.request_token(credentials, GrantType::AuthorizationCode, code.trim())
            .await
    }

    /// Trade a refresh token for a new token pair
    pub async fn refresh(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenState> {
        self.request_token(credentials, GrantType::RefreshToken, refresh_token)
            .await
    }

    async fn request_token(
        &self,
        credentials: &ClientCredentials,
        grant: GrantType,
        value: &str,
    ) -> Result<TokenState> {
        let client_id = credentials.client_id.to_string();
        let form = [
            ("client_id", client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            (grant.value_field(), value),
            ("grant_type", grant.as_str()),
        ];

        if self.debug {
            debug!(
                client_id = credentials.client_id,
                client_secret = %redact(&credentials.client_secret),
                grant_value = %redact(value),
                grant_type = grant.as_str(),
                "token request"
            );
        }

        let response = self
            .client
            .post(self.token_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| UploaderError::transport(e, self.timeout.as_secs()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(UploaderError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| UploaderError::invalid_response(format!("Failed to parse token response: {}", e)))?;

        if self.debug {
            debug!(
                access_token = %redact(&token.access_token),
                token_type = token.token_type.as_deref().unwrap_or("-"),
                expires_at = token.expires_at,
                expires_in = token.expires_in.unwrap_or_default(),
                "token {} succeeded",
                grant.as_str()
            );
        }

        TokenState::try_from(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuthClient {
        OAuthClient::new(Duration::from_secs(10)).unwrap()
    }

    #[test]
    fn test_grant_type_names() {
        assert_eq!(GrantType::AuthorizationCode.as_str(), "authorization_code");
        assert_eq!(GrantType::RefreshToken.as_str(), "refresh_token");
        assert_eq!(GrantType::AuthorizationCode.value_field(), "code");
        assert_eq!(GrantType::RefreshToken.value_field(), "refresh_token");
    }

    #[test]
    fn test_token_url() {
        assert_eq!(client().token_url(), "https://www.strava.com/oauth/token");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client =
            OAuthClient::new_with_base_url("http://localhost:9999/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.token_url(), "http://localhost:9999/oauth/token");
    }

    #[test]
    fn test_authorize_url_carries_state() {
        let url = client()
            .authorize_url(12345, "http://localhost:8501", "temp-key-1")
            .unwrap();

        assert_eq!(url.path(), "/oauth/authorize");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("client_id".into(), "12345".into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("scope".into(), "activity:write".into())));
        assert!(pairs.contains(&("state".into(), "temp-key-1".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://localhost:8501".into())));
    }

    #[tokio::test]
    async fn test_empty_code_fails_before_request() {
        let client =
            OAuthClient::new_with_base_url("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let creds = ClientCredentials::new(1, "secret");
        let err = client.exchange_code(&creds, "   ").await.unwrap_err();
        assert!(matches!(err, UploaderError::MissingCredentials(_)));
    }
}
