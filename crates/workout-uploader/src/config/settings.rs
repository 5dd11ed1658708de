use std::time::Duration;

use crate::client::api::DEFAULT_API_BASE_URL;
use crate::client::oauth::DEFAULT_OAUTH_BASE_URL;
use crate::client::{OAuthClient, StravaClient};
use crate::error::{Result, UploaderError};
use crate::workout::{Aggregator, ElapsedPolicy};

/// Redirect target registered with the API application
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost";

/// Bound on every remote round trip
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration shared by all commands
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub oauth_base_url: String,
    pub redirect_uri: String,
    pub timeout: Duration,
    pub elapsed: ElapsedPolicy,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            elapsed: ElapsedPolicy::default(),
            debug: false,
        }
    }
}

impl Settings {
    pub fn with_timeout_secs(mut self, secs: u64) -> Result<Self> {
        if secs == 0 {
            return Err(UploaderError::invalid_param("Timeout must be at least one second"));
        }
        self.timeout = Duration::from_secs(secs);
        Ok(self)
    }

    pub fn with_redirect_uri(mut self, redirect_uri: Option<String>) -> Self {
        if let Some(uri) = redirect_uri.filter(|u| !u.trim().is_empty()) {
            self.redirect_uri = uri;
        }
        self
    }

    pub fn with_elapsed(mut self, elapsed: ElapsedPolicy) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Point the clients at another host, e.g. a local mock server
    pub fn with_base_urls(mut self, api_base_url: Option<&str>, oauth_base_url: Option<&str>) -> Self {
        if let Some(url) = api_base_url {
            self.api_base_url = url.to_string();
        }
        if let Some(url) = oauth_base_url {
            self.oauth_base_url = url.to_string();
        }
        self
    }

    pub fn oauth_client(&self) -> Result<OAuthClient> {
        Ok(OAuthClient::new_with_base_url(&self.oauth_base_url, self.timeout)?.with_debug(self.debug))
    }

    pub fn api_client(&self) -> Result<StravaClient> {
        Ok(StravaClient::new_with_base_url(&self.api_base_url, self.timeout)?.with_debug(self.debug))
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.api_base_url, "https://www.strava.com");
        assert!(!settings.debug);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Settings::default().with_timeout_secs(0).is_err());
        let settings = Settings::default().with_timeout_secs(3).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_blank_redirect_keeps_default() {
        let settings = Settings::default().with_redirect_uri(Some(" ".to_string()));
        assert_eq!(settings.redirect_uri, DEFAULT_REDIRECT_URI);

        let settings =
            Settings::default().with_redirect_uri(Some("https://example.com/cb".to_string()));
        assert_eq!(settings.redirect_uri, "https://example.com/cb");
    }

    #[test]
    fn test_aggregator_uses_elapsed_policy() {
        let settings = Settings::default().with_elapsed(ElapsedPolicy::Fixed { seconds: 1800 });
        assert_eq!(
            settings.aggregator().elapsed_policy(),
            ElapsedPolicy::Fixed { seconds: 1800 }
        );
    }

    #[test]
    fn test_base_url_overrides() {
        let settings = Settings::default().with_base_urls(Some("http://127.0.0.1:8080"), None);
        assert_eq!(settings.api_base_url, "http://127.0.0.1:8080");
        assert_eq!(settings.oauth_base_url, DEFAULT_OAUTH_BASE_URL);
    }
}
