//! Strava API client for authenticated requests
//!
//! Creates manual activities with an OAuth2 bearer token. Only HTTP 201 counts
//! as success; anything else is surfaced with the raw response body.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::client::tokens::TokenState;
use crate::error::{Result, UploaderError};
use crate::logging::redact;
use crate::models::{CreatedActivity, UploadRequest};

/// Default API host
pub const DEFAULT_API_BASE_URL: &str = "https://www.strava.com";

/// User agent for API requests
const API_USER_AGENT: &str = concat!("workout-uploader/", env!("CARGO_PKG_VERSION"));

/// Strava API client
pub struct StravaClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    debug: bool,
}

impl StravaClient {
    /// Create a new API client for the public Strava host
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::new_with_base_url(DEFAULT_API_BASE_URL, timeout)
    }

    /// Create a new API client with a custom base URL (for testing)
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

    /// Log redacted request and response details
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build the full URL for a given path
    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build headers with authorization
    fn build_headers(&self, token: &TokenState) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(API_USER_AGENT));
        let auth = HeaderValue::from_str(&token.authorization_header())
            .map_err(|_| UploaderError::invalid_param("Access token contains invalid characters"))?;
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }

    /// Create a manual activity
    pub async fn create_activity(
        &self,
        token: &TokenState,
        request: &UploadRequest,
    ) -> Result<CreatedActivity> {
        let url = self.build_url("/api/v3/activities");
        let headers = self.build_headers(token)?;

        if self.debug {
            debug!(
                access_token = %redact(&token.access_token),
                name = %request.name,
                activity_type = %request.activity_type,
                start_date_local = %request.start_date_local,
                elapsed_time = request.elapsed_time,
                "create activity request"
            );
        }

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .form(request)
            .send()
            .await
            .map_err(|e| UploaderError::transport(e, self.timeout.as_secs()))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(UploaderError::ActivityCreation {
                status: status.as_u16(),
                body,
            });
        }

        let activity: CreatedActivity = response.json().await.map_err(|e| {
            UploaderError::invalid_response(format!("Failed to parse activity response: {}", e))
        })?;

        if self.debug {
            debug!(id = activity.id, "create activity response");
        }

        Ok(activity)
    }
}
