//! Authorization state for one interactive user
//!
//! `AuthSession` is the only holder of a live token. Callers go through
//! [`AuthSession::ensure_fresh`] before every authenticated request so an
//! expired access token is refreshed exactly once, first.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::client::oauth::OAuthClient;
use crate::client::tokens::{ClientCredentials, TokenState};
use crate::error::{Result, UploaderError};

/// Where the session is in the authorization flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Unauthenticated,
    Authenticated,
    Refreshing,
    Failed,
}

#[derive(Debug)]
pub struct AuthSession {
    credentials: ClientCredentials,
    token: Option<TokenState>,
    phase: AuthPhase,
}

impl AuthSession {
    pub fn new(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            token: None,
            phase: AuthPhase::Unauthenticated,
        }
    }

    /// Resume a session from a stored token
    pub fn with_token(credentials: ClientCredentials, token: TokenState) -> Self {
        Self {
            credentials,
            token: Some(token),
            phase: AuthPhase::Authenticated,
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    pub fn token(&self) -> Option<&TokenState> {
        self.token.as_ref()
    }

    /// Exchange an authorization code. A rejection leaves no token behind;
    /// local and transport failures leave the session as it was.
    pub async fn exchange_code(&mut self, oauth: &OAuthClient, code: &str) -> Result<&TokenState> {
        match oauth.exchange_code(&self.credentials, code).await {
            Ok(token) => {
                self.phase = AuthPhase::Authenticated;
                let token: &TokenState = self.token.insert(token);
                Ok(token)
            }
            Err(e) => {
                if e.is_rejection() {
                    self.fail();
                }
                Err(e)
            }
        }
    }

    /// Return a usable token, refreshing first when it has expired at `now`.
    pub async fn ensure_fresh(
        &mut self,
        oauth: &OAuthClient,
        now: DateTime<Utc>,
    ) -> Result<&TokenState> {
        let refresh_token = match (&self.phase, &self.token) {
            (AuthPhase::Authenticated, Some(token)) if !token.is_expired_at(now) => None,
            (AuthPhase::Authenticated, Some(token)) => Some(token.refresh_token.clone()),
            _ => return Err(UploaderError::NotAuthenticated),
        };

        if let Some(refresh_token) = refresh_token {
            info!("Access token expired, refreshing");
            self.phase = AuthPhase::Refreshing;
            match oauth.refresh(&self.credentials, &refresh_token).await {
                Ok(token) => {
                    self.token = Some(token);
                    self.phase = AuthPhase::Authenticated;
                }
                Err(e) if e.is_rejection() => {
                    warn!("Token refresh rejected");
                    self.fail();
                    return Err(e);
                }
                Err(e) => {
                    // Stored refresh token is still good, retry on the next call
                    warn!("Token refresh failed: {}", e);
                    self.phase = AuthPhase::Authenticated;
                    return Err(e);
                }
            }
        }

        self.token.as_ref().ok_or(UploaderError::NotAuthenticated)
    }

    /// Drop the token and return to the start of the flow
    pub fn logout(&mut self) {
        self.token = None;
        self.phase = AuthPhase::Unauthenticated;
    }

    fn fail(&mut self) {
        self.token = None;
        self.phase = AuthPhase::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn creds() -> ClientCredentials {
        ClientCredentials::new(42, "secret")
    }

    fn unreachable_oauth() -> OAuthClient {
        OAuthClient::new_with_base_url("http://127.0.0.1:9", std::time::Duration::from_millis(200))
            .unwrap()
    }

    #[test]
    fn test_new_session_is_unauthenticated() {
        let session = AuthSession::new(creds());
        assert_eq!(session.phase(), AuthPhase::Unauthenticated);
        assert!(session.token().is_none());
    }

    #[tokio::test]
    async fn test_ensure_fresh_without_token() {
        let mut session = AuthSession::new(creds());
        let err = session
            .ensure_fresh(&unreachable_oauth(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, UploaderError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_ensure_fresh_valid_token_skips_network() {
        let now = Utc::now();
        let token = TokenState::new("access", "refresh", now + Duration::hours(1));
        let mut session = AuthSession::with_token(creds(), token.clone());

        let fresh = session.ensure_fresh(&unreachable_oauth(), now).await.unwrap();
        assert_eq!(fresh, &token);
        assert_eq!(session.phase(), AuthPhase::Authenticated);
    }

    #[tokio::test]
    async fn test_unreachable_refresh_keeps_token() {
        let now = Utc::now();
        let token = TokenState::new("access", "refresh", now - Duration::seconds(100));
        let mut session = AuthSession::with_token(creds(), token.clone());

        let err = session.ensure_fresh(&unreachable_oauth(), now).await.unwrap_err();
        assert!(!err.is_rejection());
        assert_eq!(session.phase(), AuthPhase::Authenticated);
        assert_eq!(session.token(), Some(&token));
    }

    #[tokio::test]
    async fn test_empty_code_keeps_session_unauthenticated() {
        let mut session = AuthSession::new(creds());
        let err = session.exchange_code(&unreachable_oauth(), " ").await.unwrap_err();
        assert!(matches!(err, UploaderError::MissingCredentials(_)));
        assert_eq!(session.phase(), AuthPhase::Unauthenticated);
    }

    #[test]
    fn test_logout() {
        let token = TokenState::new("access", "refresh", Utc::now());
        let mut session = AuthSession::with_token(creds(), token);
        session.logout();
        assert_eq!(session.phase(), AuthPhase::Unauthenticated);
        assert!(session.token().is_none());
    }
}
