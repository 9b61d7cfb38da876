//! Bearer-token persistence and the session context built on top of it.
//!
//! # Design
//! A `CredentialStore` holds at most one token under the `accessToken` key.
//! `Session` wraps a shared store and is passed explicitly into the
//! `TodoClient` constructor, so every request reads the token from the
//! session it was built with instead of from process-wide state.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "accessToken";

/// Persistent slot for a single bearer token.
pub trait CredentialStore: Send + Sync {
    /// Store `token`, overwriting any previous value. No validation.
    fn put(&self, token: &str) -> Result<(), StoreError>;

    /// The stored token, or `None` if none was ever stored.
    fn get(&self) -> Option<String>;

    /// Remove the stored token.
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-process store; the token lives as long as the value.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn put(&self, token: &str) -> Result<(), StoreError> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.token.write() = None;
        Ok(())
    }
}

/// On-disk layout: a JSON object with the token under `TOKEN_KEY`. Other
/// keys found in the file are kept on rewrite.
type StoredCredentials = Map<String, Value>;

/// JSON file store that survives process restarts.
///
/// The file holds `{"accessToken": "<token>"}` and is written with mode
/// `0o600` on unix.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Option<StoredCredentials> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to read credentials file: {e}");
                return None;
            }
        };
        match serde_json::from_str::<StoredCredentials>(&data) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to parse credentials file: {e}");
                None
            }
        }
    }

    fn save(&self, stored: &StoredCredentials) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(stored)?;
        std::fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&self.path, perms);
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn put(&self, token: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut stored = self.load().unwrap_or_default();
        stored.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.save(&stored)
    }

    fn get(&self) -> Option<String> {
        self.load()?.get(TOKEN_KEY)?.as_str().map(str::to_owned)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// Session context shared by every request a client issues.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn CredentialStore>,
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// A session backed by a fresh `MemoryCredentialStore`.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()))
    }

    /// A session persisted to the credentials file at `path`.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileCredentialStore::new(path)))
    }

    pub fn token(&self) -> Option<String> {
        self.store.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.put(token)
    }

    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.clear()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert!(store.get().is_none());
        for token in ["a", "eyJhbGciOiJIUzI1NiJ9.payload.sig", "  spaced  "] {
            store.put(token).unwrap();
            assert_eq!(store.get().as_deref(), Some(token));
        }
        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn file_store_survives_new_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        FileCredentialStore::new(&path).put("tok-1").unwrap();
        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.get().as_deref(), Some("tok-1"));

        reopened.put("tok-2").unwrap();
        assert_eq!(reopened.get().as_deref(), Some("tok-2"));
    }

    #[test]
    fn file_store_uses_access_token_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        FileCredentialStore::new(&path).put("abc").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[TOKEN_KEY], "abc");
        assert_eq!(raw, serde_json::json!({ "accessToken": "abc" }));
    }

    #[test]
    fn file_store_keeps_unrelated_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"theme":"dark","accessToken":"old"}"#).unwrap();

        let store = FileCredentialStore::new(&path);
        assert_eq!(store.get().as_deref(), Some("old"));
        store.put("new").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[TOKEN_KEY], "new");
    }

    #[test]
    fn file_store_ignores_non_string_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"accessToken":42}"#).unwrap();
        assert!(FileCredentialStore::new(&path).get().is_none());
    }

    #[test]
    fn file_store_missing_or_corrupt_file_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::new(&path);
        assert!(store.get().is_none());

        std::fs::write(&path, "not json").unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        store.clear().unwrap();
        store.put("x").unwrap();
        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        store.put("secret").unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn session_logout_clears_token() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());
        session.set_token("t").unwrap();
        assert!(session.is_authenticated());
        session.logout().unwrap();
        assert!(session.token().is_none());
    }
}
