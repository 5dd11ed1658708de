use crate::client::{ClientCredentials, TokenState};
use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CLIENT_FILENAME: &str = "client.json";
const TOKEN_FILENAME: &str = "token.json";

/// Per-profile storage for the API client credentials and the current token.
pub struct CredentialStore {
    profile: String,
    base_dir: PathBuf,
}

impl CredentialStore {
    /// Create a new credential store for the given profile
    pub fn new(profile: Option<String>) -> Result<Self> {
        let profile = profile.unwrap_or_else(|| "default".to_string());
        let base_dir = super::data_dir()?.join(&profile);
        super::ensure_dir(&base_dir)?;

        Ok(Self { profile, base_dir })
    }

    /// Create a credential store with a custom base directory (for testing)
    pub fn with_dir(profile: impl Into<String>, base_dir: PathBuf) -> Result<Self> {
        let profile = profile.into();
        let dir = base_dir.join(&profile);
        super::ensure_dir(&dir)?;

        Ok(Self {
            profile,
            base_dir: dir,
        })
    }

    /// Get the profile name
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Save client credentials to storage
    pub fn save_client(&self, credentials: &ClientCredentials) -> Result<()> {
        write_private(&self.base_dir.join(CLIENT_FILENAME), credentials)
    }

    /// Load client credentials from storage
    pub fn load_client(&self) -> Result<Option<ClientCredentials>> {
        read_json(&self.base_dir.join(CLIENT_FILENAME))
    }

    /// Save the token to storage
    pub fn save_token(&self, token: &TokenState) -> Result<()> {
        write_private(&self.base_dir.join(TOKEN_FILENAME), token)
    }

    /// Load the token from storage
    pub fn load_token(&self) -> Result<Option<TokenState>> {
        read_json(&self.base_dir.join(TOKEN_FILENAME))
    }

    /// Load client and token, returns None if either is missing
    pub fn load_session(&self) -> Result<Option<(ClientCredentials, TokenState)>> {
        match (self.load_client()?, self.load_token()?) {
            (Some(client), Some(token)) => Ok(Some((client, token))),
            _ => Ok(None),
        }
    }

    /// Check if a complete session is stored
    pub fn has_credentials(&self) -> bool {
        self.base_dir.join(CLIENT_FILENAME).exists() && self.base_dir.join(TOKEN_FILENAME).exists()
    }

    /// Remove only the token, keeping client credentials for re-authorization
    pub fn clear_token(&self) -> Result<()> {
        remove_if_exists(&self.base_dir.join(TOKEN_FILENAME))
    }

    /// Clear all stored credentials
    pub fn clear(&self) -> Result<()> {
        remove_if_exists(&self.base_dir.join(CLIENT_FILENAME))?;
        remove_if_exists(&self.base_dir.join(TOKEN_FILENAME))
    }
}

fn write_private<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;

    // Set restrictive permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&json)?))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
