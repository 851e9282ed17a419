//! State persistence.
//!
//! The whole engine state is one JSON document behind a small key-value
//! style interface. `load` hands back the raw JSON so the caller can merge
//! defaults over old-schema blobs; `save` always writes the full current
//! schema.

pub mod config;

pub use config::Config;

use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::state::AppState;

/// Durable storage for the single state document.
pub trait StateStore {
    /// Raw persisted blob, or `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<serde_json::Value>, StorageError>;

    /// Persist the full state.
    fn save(&self, state: &AppState) -> Result<(), StorageError>;
}

/// Returns `~/.config/thinkfirst[-dev]/` based on THINKFIRST_ENV.
///
/// Set THINKFIRST_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("THINKFIRST_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("thinkfirst-dev")
    } else {
        base_dir.join("thinkfirst")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// File-backed store holding the state as one pretty-printed JSON document.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at the default location (`data_dir()/state.json`).
    pub fn open_default() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            path: data_dir()?.join("state.json"),
        })
    }

    /// Store at an explicit path (tests, alternate profiles).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<serde_json::Value>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    path: self.path.clone(),
                    message: e.to_string(),
                })
            }
        };
        let value =
            serde_json::from_str(&content).map_err(|e| StorageError::Corrupted(e.to_string()))?;
        Ok(Some(value))
    }

    fn save(&self, state: &AppState) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StorageError::Encode(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| StorageError::WriteFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// In-memory store for tests and embedding without a filesystem.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start pre-populated with a raw blob.
    pub fn with_value(value: serde_json::Value) -> Self {
        Self {
            slot: Mutex::new(Some(value)),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<serde_json::Value>, StorageError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::Corrupted("store lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, state: &AppState) -> Result<(), StorageError> {
        let value =
            serde_json::to_value(state).map_err(|e| StorageError::Encode(e.to_string()))?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::Corrupted("store lock poisoned".to_string()))?;
        *slot = Some(value);
        Ok(())
    }
}
