mod credentials;
mod settings;
mod temp_store;

pub use credentials::CredentialStore;
pub use settings::Settings;
pub use temp_store::{
    CachedCredentials, FileTempStore, MemoryTempStore, TempStore, TEMP_KEY_TTL,
};

use crate::error::{Result, UploaderError};
use std::path::{Path, PathBuf};

/// Directory name under the platform data dir
const DATA_DIR_NAME: &str = "workout-uploader";

/// File name of the temp-key cache inside the system temp directory
const TEMP_STORE_FILENAME: &str = "workout_uploader_temp_credentials.json";

/// Get the data directory path for storing tokens
/// Returns ~/.local/share/workout-uploader on Unix, ~/Library/Application Support/workout-uploader on macOS
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(DATA_DIR_NAME))
        .ok_or_else(|| UploaderError::config("Could not determine data directory"))
}

/// Shared path of the temp-key cache
pub fn temp_store_path() -> PathBuf {
    std::env::temp_dir().join(TEMP_STORE_FILENAME)
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_exists() {
        let dir = data_dir();
        assert!(dir.is_ok());
        assert!(dir.unwrap().ends_with("workout-uploader"));
    }

    #[test]
    fn test_temp_store_path_in_temp_dir() {
        let path = temp_store_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with(TEMP_STORE_FILENAME));
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp = tempfile::TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
