//! Persisted bearer credential.
//!
//! The token lives under one fixed key so a restarted client resumes the
//! same session. Disk failures degrade to the in-memory copy; losing a
//! persisted token only costs a re-login.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::warn;

/// Fixed storage key for the bearer token.
pub const CREDENTIAL_KEY: &str = "access_token";

#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<Inner>,
}

struct Inner {
    dir: Option<PathBuf>,
    cached: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Volatile store; the session dies with the process.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Inner {
                dir: None,
                cached: RwLock::new(None),
            }),
        }
    }

    /// Disk-backed store rooted at `dir`. Any token persisted by an earlier
    /// run is restored immediately.
    pub fn on_disk(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let existing = std::fs::read_to_string(dir.join(CREDENTIAL_KEY))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            inner: Arc::new(Inner {
                dir: Some(dir),
                cached: RwLock::new(existing),
            }),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .cached
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set(&self, token: &str) {
        *self
            .inner
            .cached
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.to_string());
        if let Some(dir) = &self.inner.dir {
            if let Err(err) = std::fs::create_dir_all(dir)
                .and_then(|_| std::fs::write(dir.join(CREDENTIAL_KEY), token))
            {
                warn!(%err, "failed to persist credential");
            }
        }
    }

    pub fn clear(&self) {
        *self
            .inner
            .cached
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        if let Some(dir) = &self.inner.dir {
            let path = dir.join(CREDENTIAL_KEY);
            if path.exists() {
                if let Err(err) = std::fs::remove_file(&path) {
                    warn!(%err, "failed to remove persisted credential");
                }
            }
        }
    }
}
