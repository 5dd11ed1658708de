//! Short-lived credential cache keyed by temp-key
//!
//! Client credentials are parked here while the user visits the authorization
//! page; the temp-key travels as the OAuth `state` parameter and brings them
//! back after the redirect. Entries expire after [`TEMP_KEY_TTL`] regardless of
//! token lifetime.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::ClientCredentials;
use crate::error::{Result, UploaderError};

/// How long a temp-key stays valid
pub const TEMP_KEY_TTL: Duration = Duration::from_secs(300);

/// Stored entry, `expires_at` in unix seconds
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedCredentials {
    pub client_id: u64,
    pub client_secret: String,
    pub expires_at: i64,
}

impl CachedCredentials {
    fn new(credentials: &ClientCredentials, ttl: Duration) -> Self {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret.clone(),
            expires_at: Utc::now().timestamp().saturating_add(ttl),
        }
    }

    fn is_live(&self, now: i64) -> bool {
        self.expires_at > now
    }

    fn credentials(&self) -> ClientCredentials {
        ClientCredentials::new(self.client_id, self.client_secret.clone())
    }
}

/// Key/value store with per-entry expiry
pub trait TempStore {
    fn put(&self, key: &str, credentials: &ClientCredentials, ttl: Duration) -> Result<()>;

    /// Live entry for `key`; expired entries read as absent
    fn get(&self, key: &str) -> Result<Option<ClientCredentials>>;

    /// Returns whether an entry was removed
    fn remove(&self, key: &str) -> Result<bool>;

    /// Drop expired entries, returning how many were dropped
    fn sweep_expired(&self) -> Result<usize>;

    fn clear(&self) -> Result<()>;

    /// Park credentials under a fresh temp-key
    fn stash(&self, credentials: &ClientCredentials) -> Result<String> {
        let key = Uuid::new_v4().to_string();
        self.put(&key, credentials, TEMP_KEY_TTL)?;
        Ok(key)
    }

    /// Credentials parked under `key`, or `MissingCredentials` if gone
    fn recover(&self, key: &str) -> Result<ClientCredentials> {
        self.get(key)?.ok_or_else(|| {
            UploaderError::missing("Credentials for this authorization expired. Please re-enter them.")
        })
    }
}

type Entries = HashMap<String, CachedCredentials>;

/// JSON file shared by every process on the machine.
///
/// Writes replace the whole file through a uniquely named temp file and a
/// rename, so readers never observe a partial write.
pub struct FileTempStore {
    path: PathBuf,
}

impl FileTempStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the shared system temp path
    pub fn shared() -> Self {
        Self::new(super::temp_store_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Entries {
        if !self.path.exists() {
            return Entries::new();
        }
        match fs::read_to_string(&self.path)
            .map_err(UploaderError::from)
            .and_then(|json| serde_json::from_str(&json).map_err(UploaderError::from))
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), "Ignoring unreadable temp storage: {}", e);
                Entries::new()
            }
        }
    }

    fn save(&self, entries: &Entries) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            super::ensure_dir(dir)?;
        }

        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        let json = serde_json::to_string(entries)?;
        fs::write(&temp_path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

impl TempStore for FileTempStore {
    fn put(&self, key: &str, credentials: &ClientCredentials, ttl: Duration) -> Result<()> {
        let mut entries = self.load();
        entries.insert(key.to_string(), CachedCredentials::new(credentials, ttl));
        self.save(&entries)
    }

    fn get(&self, key: &str) -> Result<Option<ClientCredentials>> {
        let now = Utc::now().timestamp();
        Ok(self
            .load()
            .get(key)
            .filter(|e| e.is_live(now))
            .map(CachedCredentials::credentials))
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.load();
        let removed = entries.remove(key).is_some();
        if removed {
            self.save(&entries)?;
        }
        Ok(removed)
    }

    fn sweep_expired(&self) -> Result<usize> {
        let now = Utc::now().timestamp();
        let mut entries = self.load();
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        let dropped = before - entries.len();
        if dropped > 0 {
            debug!(dropped, "Swept expired temp keys");
            self.save(&entries)?;
        }
        Ok(dropped)
    }

    fn clear(&self) -> Result<()> {
        self.save(&Entries::new())
    }
}

/// Process-local store, same semantics as the file store
#[derive(Default)]
pub struct MemoryTempStore {
    entries: Mutex<Entries>,
}

impl MemoryTempStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Entries>> {
        self.entries
            .lock()
            .map_err(|_| UploaderError::Other("temp store lock poisoned".to_string()))
    }
}

impl TempStore for MemoryTempStore {
    fn put(&self, key: &str, credentials: &ClientCredentials, ttl: Duration) -> Result<()> {
        self.lock()?
            .insert(key.to_string(), CachedCredentials::new(credentials, ttl));
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<ClientCredentials>> {
        let now = Utc::now().timestamp();
        Ok(self
            .lock()?
            .get(key)
            .filter(|e| e.is_live(now))
            .map(CachedCredentials::credentials))
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    fn sweep_expired(&self) -> Result<usize> {
        let now = Utc::now().timestamp();
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        Ok(before - entries.len())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn creds() -> ClientCredentials {
        ClientCredentials::new(12345, "client-secret")
    }

    fn file_store(temp: &TempDir) -> FileTempStore {
        FileTempStore::new(temp.path().join("temp_credentials.json"))
    }

    fn exercise_store(store: &dyn TempStore) {
        store.put("live", &creds(), TEMP_KEY_TTL).unwrap();
        store.put("dead", &creds(), Duration::ZERO).unwrap();

        assert_eq!(store.get("live").unwrap(), Some(creds()));
        assert_eq!(store.get("dead").unwrap(), None);
        assert_eq!(store.get("missing").unwrap(), None);

        assert_eq!(store.sweep_expired().unwrap(), 1);
        assert_eq!(store.sweep_expired().unwrap(), 0);

        assert!(store.remove("live").unwrap());
        assert!(!store.remove("live").unwrap());
    }

    #[test]
    fn test_memory_store_semantics() {
        exercise_store(&MemoryTempStore::new());
    }

    #[test]
    fn test_file_store_semantics() {
        let temp = TempDir::new().unwrap();
        exercise_store(&file_store(&temp));
    }

    #[test]
    fn test_stash_and_recover() {
        let store = MemoryTempStore::new();
        let key = store.stash(&creds()).unwrap();

        assert!(Uuid::parse_str(&key).is_ok());
        assert_eq!(store.recover(&key).unwrap(), creds());
    }

    #[test]
    fn test_recover_unknown_key() {
        let err = MemoryTempStore::new().recover("nope").unwrap_err();
        assert!(matches!(err, UploaderError::MissingCredentials(_)));
    }

    #[test]
    fn test_file_store_shared_between_handles() {
        let temp = TempDir::new().unwrap();
        let writer = file_store(&temp);
        let reader = file_store(&temp);

        let key = writer.stash(&creds()).unwrap();
        assert_eq!(reader.recover(&key).unwrap(), creds());
    }

    #[test]
    fn test_file_store_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let store = file_store(&temp);
        store.stash(&creds()).unwrap();
        store.stash(&creds()).unwrap();

        let files: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_file_store_on_disk_format() {
        let temp = TempDir::new().unwrap();
        let store = file_store(&temp);
        store.put("k", &creds(), TEMP_KEY_TTL).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(json["k"]["client_id"], 12345);
        assert_eq!(json["k"]["client_secret"], "client-secret");
        assert!(json["k"]["expires_at"].as_i64().unwrap() > Utc::now().timestamp());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let temp = TempDir::new().unwrap();
        let store = file_store(&temp);
        fs::write(store.path(), "{not json").unwrap();

        assert_eq!(store.get("anything").unwrap(), None);
        store.put("k", &creds(), TEMP_KEY_TTL).unwrap();
        assert!(store.get("k").unwrap().is_some());
    }

    #[test]
    fn test_clear() {
        let temp = TempDir::new().unwrap();
        let store = file_store(&temp);
        let key = store.stash(&creds()).unwrap();
        store.clear().unwrap();
        assert!(store.get(&key).unwrap().is_none());
    }
}
