//! Session persistence for the simctl CLI/TUI.
//!
//! The backend identifies the operator by user name only; every resource
//! path carries it (`/devices/{user}`). This module keeps that name, plus a
//! couple of lightweight preferences, in a JSON file under the standard
//! configuration directory (`~/.config/simctl/session.json` on most
//! platforms). The store is safe to share between threads thanks to the
//! internal `Mutex`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use simctl_types::{DeviceKind, Region};
use thiserror::Error;
use tracing::{info, warn};

use crate::{default_config_file, path_from_env};

/// Environment variable allowing callers to override the session file path.
pub const SESSION_PATH_ENV: &str = "SIMCTL_SESSION_PATH";

/// Environment variable that overrides the stored user for one invocation.
pub const SESSION_USER_ENV: &str = "SIMCTL_USER";

/// Default filename for the JSON payload.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Error surfaced when reading or writing the session fails.
#[derive(Debug, Error)]
pub enum SessionError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not logged in; run `simctl login <user>` first")]
    NotLoggedIn,
    #[error("user name must not be empty")]
    EmptyUser,
}

/// Persisted session values.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub user_name: Option<String>,
    /// Device kind preselected when the wizard opens from the CLI.
    #[serde(default)]
    pub default_kind: Option<DeviceKind>,
    /// Region preselected on new drafts.
    #[serde(default)]
    pub default_region: Option<Region>,
}

/// Thread-safe session store backed by a JSON file.
#[derive(Debug, Default)]
pub struct SessionStore {
    path: PathBuf,
    payload: Mutex<SessionPayload>,
    persist_to_disk: bool,
    user_override: Option<String>,
}

impl SessionStore {
    /// Open the store at `SIMCTL_SESSION_PATH` or the default config path.
    pub fn new() -> Result<Self, SessionError> {
        let path = path_from_env(SESSION_PATH_ENV).unwrap_or_else(|| default_config_file(SESSION_FILE_NAME));
        Self::at_path(path)
    }

    /// Open the store rooted at an explicit file path.
    pub fn at_path(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let payload = load_payload(&path)?;
        Ok(Self {
            path,
            payload: Mutex::new(payload),
            persist_to_disk: true,
            user_override: user_from_env(),
        })
    }

    /// In-memory store used as a fallback when the config directory cannot be accessed.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            payload: Mutex::new(SessionPayload::default()),
            persist_to_disk: false,
            user_override: user_from_env(),
        }
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current user: `SIMCTL_USER` when set, otherwise the stored login.
    pub fn user(&self) -> Option<String> {
        self.user_override.clone().or_else(|| self.lock().user_name.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// The current user, or [`SessionError::NotLoggedIn`].
    pub fn require_user(&self) -> Result<String, SessionError> {
        self.user().ok_or(SessionError::NotLoggedIn)
    }

    pub fn login(&self, user_name: &str) -> Result<(), SessionError> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(SessionError::EmptyUser);
        }
        self.update(|payload| payload.user_name = Some(user_name.to_string()))?;
        info!(user = user_name, "session started");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.update(|payload| payload.user_name = None)?;
        info!("session cleared");
        Ok(())
    }

    pub fn default_kind(&self) -> DeviceKind {
        self.lock().default_kind.unwrap_or_default()
    }

    pub fn set_default_kind(&self, kind: Option<DeviceKind>) -> Result<(), SessionError> {
        self.update(|payload| payload.default_kind = kind)
    }

    pub fn default_region(&self) -> Option<Region> {
        self.lock().default_region
    }

    pub fn set_default_region(&self, region: Option<Region>) -> Result<(), SessionError> {
        self.update(|payload| payload.default_region = region)
    }

    fn lock(&self) -> MutexGuard<'_, SessionPayload> {
        self.payload.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, change: impl FnOnce(&mut SessionPayload)) -> Result<(), SessionError> {
        let mut payload = self.lock();
        change(&mut payload);
        if self.persist_to_disk {
            self.save_locked(&payload)?;
        }
        Ok(())
    }

    fn save_locked(&self, payload: &SessionPayload) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(payload)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn user_from_env() -> Option<String> {
    std::env::var(SESSION_USER_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn load_payload(path: &Path) -> Result<SessionPayload, SessionError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse session file; using defaults"
                );
                Ok(SessionPayload::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(SessionPayload::default()),
        Err(error) => Err(SessionError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_persists_and_logout_clears() {
        temp_env::with_var_unset(SESSION_USER_ENV, || {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join(SESSION_FILE_NAME);

            let store = SessionStore::at_path(&path).unwrap();
            assert!(!store.is_authenticated());
            assert!(matches!(store.require_user(), Err(SessionError::NotLoggedIn)));

            store.login("  operator ").unwrap();
            let reopened = SessionStore::at_path(&path).unwrap();
            assert_eq!(reopened.user().as_deref(), Some("operator"));

            reopened.logout().unwrap();
            assert!(!SessionStore::at_path(&path).unwrap().is_authenticated());
        });
    }

    #[test]
    fn env_user_overrides_the_stored_login() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE_NAME);
        temp_env::with_var(SESSION_USER_ENV, Some("ci-bot"), || {
            let store = SessionStore::at_path(&path).unwrap();
            assert_eq!(store.require_user().unwrap(), "ci-bot");
        });
    }

    #[test]
    fn session_path_env_is_honoured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        temp_env::with_vars(
            [(SESSION_PATH_ENV, Some(path.to_str().unwrap())), (SESSION_USER_ENV, None)],
            || {
                let store = SessionStore::new().unwrap();
                assert_eq!(store.path(), path.as_path());
                store.set_default_region(Some(Region::Eu868)).unwrap();
                assert!(path.exists());
            },
        );
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE_NAME);
        fs::write(&path, "{not json").unwrap();
        let store = SessionStore::at_path(&path).unwrap();
        assert_eq!(store.default_kind(), DeviceKind::Lorawan);
        assert_eq!(store.default_region(), None);
    }

    #[test]
    fn empty_user_is_rejected() {
        let store = SessionStore::ephemeral();
        assert!(matches!(store.login("   "), Err(SessionError::EmptyUser)));
    }
}
