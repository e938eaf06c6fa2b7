//! Persistent credential storage.
//!
//! The production store is a JSON object in the user's config directory,
//! `<config dir>/chime/credentials.json`. Only one logical key is in use
//! (`token`), so reads and writes are single-key atomic operations.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::StoreError;

/// Key the auth token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Durable key/value storage for credentials.
pub trait CredentialStore {
    /// Read a value, `None` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value durably.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// JSON-file-backed credential store.
pub struct FileCredentialStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileCredentialStore {
    /// Open the store at the default location, loading any existing file.
    pub fn open() -> Result<Self, StoreError> {
        Self::with_path(Self::default_path()?)
    }

    /// Open a store backed by a specific file.
    pub fn with_path(path: PathBuf) -> Result<Self, StoreError> {
        let values = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&contents) {
                Ok(values) => values,
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "credential store unreadable, starting fresh"
                    );
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Default store path: `<config dir>/chime/credentials.json`.
    fn default_path() -> Result<PathBuf, StoreError> {
        let config_dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(config_dir.join("chime").join("credentials.json"))
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "credential store saved");
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }
}
