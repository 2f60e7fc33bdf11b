//! Durable session persistence under two keys, `auth_token` and `auth_user`.
//!
//! `SessionStore` never fails its caller: a lost session only means signing in
//! again, so backend errors are logged and degrade to "no session".

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

use super::session::{token_fingerprint, Session};

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "auth_user";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid key '{0}'")]
    InvalidKey(String),
    #[error("i/o error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Minimal string key-value persistence.
pub trait KvBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self { Self::default() }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.map.write().remove(key);
        Ok(())
    }
}

/// One file per key inside a directory. Writes land in a temp file that is then
/// renamed over the target, so readers see either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let ok = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !ok { return Err(StoreError::InvalidKey(key.to_string())); }
        Ok(self.dir.join(key))
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io { key: key.to_string(), source: e }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io = |e| StoreError::Io { key: key.to_string(), source: e };
        fs::create_dir_all(&self.dir).map_err(io)?;
        let tmp = self.dir.join(format!(".{}.tmp", key));
        {
            let mut f = fs::File::create(&tmp).map_err(io)?;
            f.write_all(value.as_bytes()).map_err(io)?;
            f.sync_all().map_err(io)?;
        }
        fs::rename(&tmp, &path).map_err(io)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io { key: key.to_string(), source: e }),
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KvBackend>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self { Self { backend } }

    pub fn in_memory() -> Self { Self::new(Arc::new(MemoryBackend::new())) }

    pub fn on_disk(dir: impl Into<PathBuf>) -> Self { Self::new(Arc::new(FileBackend::new(dir))) }

    /// Persist a successful session. Returns whether it was written; invalid
    /// sessions (`success == false` or no token) are refused. A failed write
    /// leaves the store empty.
    pub fn save(&self, session: &Session) -> bool {
        if !session.is_valid() {
            warn!(target: "rolegate::session", "refusing to persist unsuccessful or tokenless session");
            return false;
        }
        let json = match serde_json::to_string(session) {
            Ok(j) => j,
            Err(e) => {
                warn!(target: "rolegate::session", "session serialization failed: {}", e);
                return false;
            }
        };
        // profile first: load() keys off auth_user. A partial write must not
        // leave one user's profile next to another user's token.
        for (key, value) in [(USER_KEY, json.as_str()), (TOKEN_KEY, session.token.as_str())] {
            if let Err(e) = self.backend.set(key, value) {
                warn!(target: "rolegate::session", "failed to write {}: {}; clearing stored session", key, e);
                self.clear();
                return false;
            }
        }
        debug!(target: "rolegate::session", "session saved user={} token={}", session.user_id, token_fingerprint(&session.token));
        true
    }

    /// Persisted session, if one is present and well-formed. Unparsable data is
    /// removed so the next launch starts clean.
    pub fn load(&self) -> Option<Session> {
        let raw = match self.backend.get(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(target: "rolegate::session", "failed to read {}: {}", USER_KEY, e);
                return None;
            }
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(s) if s.is_valid() => Some(s),
            Ok(_) => {
                warn!(target: "rolegate::session", "persisted session is not a valid sign-in; discarding");
                self.clear();
                None
            }
            Err(e) => {
                warn!(target: "rolegate::session", "persisted session is corrupt ({}); discarding", e);
                self.clear();
                None
            }
        }
    }

    /// Remove both keys. Safe to call on an empty store.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.backend.remove(key) {
                warn!(target: "rolegate::session", "failed to remove {}: {}", key, e);
            }
        }
    }

    /// Token used to decorate outgoing requests. Read errors count as absent.
    pub fn get_token(&self) -> Option<String> {
        match self.backend.get(TOKEN_KEY) {
            Ok(tok) => tok.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!(target: "rolegate::session", "failed to read {}: {}", TOKEN_KEY, e);
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
