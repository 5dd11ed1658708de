//! Authentication commands for workout-uploader

use chrono::Utc;
use url::Url;

use crate::client::{AuthSession, ClientCredentials};
use crate::config::{CredentialStore, FileTempStore, Settings, TempStore};
use crate::error::{Result, UploaderError};

/// Shown in place of the client secret, independent of its length
const SECRET_MASK: &str = "********";

/// Validate the API application credentials and print the authorization URL
pub async fn init(client_id: &str, client_secret: &str, settings: &Settings) -> Result<()> {
    let credentials = ClientCredentials::parse(client_id, client_secret)?;

    let temp = FileTempStore::shared();
    temp.sweep_expired()?;
    let temp_key = temp.stash(&credentials)?;

    let url = settings
        .oauth_client()?
        .authorize_url(credentials.client_id, &settings.redirect_uri, &temp_key)?;

    println!("Client ID: {}", credentials.client_id);
    println!();
    println!("To authorize:");
    println!("  1. Open the URL below and click \"Authorize\".");
    println!("  2. Copy the address you are redirected to (or just its 'code' value).");
    println!("  3. Run: workout-uploader auth login --code '<address or code>'");
    println!();
    println!("{}", url);
    println!();
    println!("This authorization request expires in 5 minutes.");

    Ok(())
}

/// Exchange an authorization code and store the resulting token
pub async fn login(
    code: &str,
    state: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    profile: Option<String>,
    settings: &Settings,
) -> Result<()> {
    let (code, state) = parse_redirect(code, state);
    let store = CredentialStore::new(profile)?;
    let temp = FileTempStore::shared();

    let credentials = resolve_credentials(client_id, client_secret, state.as_deref(), &temp, &store)?;

    let oauth = settings.oauth_client()?;
    let mut session = AuthSession::new(credentials);
    session.exchange_code(&oauth, &code).await?;
    let token = session.token().ok_or(UploaderError::NotAuthenticated)?;

    store.save_client(session.credentials())?;
    store.save_token(token)?;

    if let Some(key) = state {
        temp.remove(&key)?;
    }

    println!("Successfully authorized!");
    println!("Profile: {}", store.profile());

    Ok(())
}

/// Force a token refresh
pub async fn refresh(profile: Option<String>, settings: &Settings) -> Result<()> {
    let store = CredentialStore::new(profile)?;
    let (credentials, token) = store
        .load_session()?
        .ok_or(UploaderError::NotAuthenticated)?;

    let oauth = settings.oauth_client()?;
    match oauth.refresh(&credentials, &token.refresh_token).await {
        Ok(new_token) => {
            store.save_token(&new_token)?;
            println!("Access token refreshed.");
            print_expiry(new_token.expires_in(Utc::now()));
            Ok(())
        }
        Err(e) => {
            if e.is_rejection() {
                store.clear_token()?;
            }
            Err(e)
        }
    }
}

/// Execute the logout command
pub async fn logout(profile: Option<String>) -> Result<()> {
    let store = CredentialStore::new(profile)?;

    if !store.has_credentials() {
        println!("Not logged in.");
        return Ok(());
    }

    store.clear()?;
    println!("Successfully logged out.");
    Ok(())
}

/// Logout and drop every pending authorization
pub async fn reset(profile: Option<String>) -> Result<()> {
    let store = CredentialStore::new(profile)?;
    store.clear()?;
    FileTempStore::shared().clear()?;

    println!("Application has been reset.");
    Ok(())
}

/// Execute the status command
pub async fn status(profile: Option<String>) -> Result<()> {
    let store = CredentialStore::new(profile)?;

    match store.load_session()? {
        Some((credentials, token)) => {
            println!("Status: Logged in");
            println!("Profile: {}", store.profile());
            println!("Client ID: {}", credentials.client_id);
            println!("Client Secret: {}", SECRET_MASK);

            let expires_in = token.expires_in(Utc::now());
            if token.is_expired() {
                println!("Access Token: Expired (will refresh on next upload)");
            } else {
                print_expiry(expires_in);
            }
        }
        None => {
            println!("Status: Not logged in");
            println!("Run 'workout-uploader auth init' to authorize.");
        }
    }

    Ok(())
}

/// Load the stored session for authenticated commands
pub fn load_session(store: &CredentialStore) -> Result<AuthSession> {
    let (credentials, token) = store
        .load_session()?
        .ok_or(UploaderError::NotAuthenticated)?;
    Ok(AuthSession::with_token(credentials, token))
}

/// Credentials from explicit flags, else the temp-key, else the profile
fn resolve_credentials(
    client_id: Option<String>,
    client_secret: Option<String>,
    state: Option<&str>,
    temp: &dyn TempStore,
    store: &CredentialStore,
) -> Result<ClientCredentials> {
    if client_id.is_some() || client_secret.is_some() {
        return ClientCredentials::parse(
            client_id.as_deref().unwrap_or_default(),
            client_secret.as_deref().unwrap_or_default(),
        );
    }
    if let Some(key) = state {
        return temp.recover(key);
    }
    store.load_client()?.ok_or_else(|| {
        UploaderError::missing("Credentials could not be retrieved. Please run 'auth init' again.")
    })
}

/// Accept either a bare code or the full redirect address
fn parse_redirect(input: &str, state: Option<String>) -> (String, Option<String>) {
    let input = input.trim();
    if let Ok(url) = Url::parse(input) {
        let mut code = None;
        let mut url_state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => url_state = Some(value.into_owned()),
                _ => {}
            }
        }
        if let Some(code) = code {
            return (code, state.or(url_state));
        }
    }
    (input.to_string(), state)
}

fn print_expiry(expires_in: i64) {
    if expires_in > 3600 {
        println!("Access Token: Valid (expires in {} hours)", expires_in / 3600);
    } else if expires_in > 60 {
        println!("Access Token: Valid (expires in {} minutes)", expires_in / 60);
    } else {
        println!("Access Token: Valid (expires in {} seconds)", expires_in);
    }
}
