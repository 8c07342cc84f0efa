//! Persisted key map and profile list
//!
//! Two JSON documents in the data directory, each rewritten in full on
//! every change. Reads never fail: a missing or corrupt key map falls back
//! to the factory bindings, a missing or corrupt profile list to empty.

use cardputer_sim::{KeyMapping, ProfileStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Key map file name inside the data directory
pub const KEYMAP_FILE: &str = "keymap.json";
/// Profile list file name inside the data directory
pub const PROFILES_FILE: &str = "profiles.json";

/// Errors reading or writing persisted state
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON file store rooted at a data directory
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn keymap_path(&self) -> PathBuf {
        self.dir.join(KEYMAP_FILE)
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.dir.join(PROFILES_FILE)
    }

    /// Persisted key map, or the factory table
    pub fn load_keymap(&self) -> KeyMapping {
        let path = self.keymap_path();
        match read_json(&path) {
            Ok(Some(keymap)) => keymap,
            Ok(None) => {
                debug!("No key map at {}, using defaults", path.display());
                KeyMapping::default()
            }
            Err(e) => {
                warn!("{e}; using default key map");
                KeyMapping::default()
            }
        }
    }

    /// Persisted profiles, or an empty store
    pub fn load_profiles(&self) -> ProfileStore {
        let path = self.profiles_path();
        match read_json(&path) {
            Ok(Some(profiles)) => profiles,
            Ok(None) => ProfileStore::new(),
            Err(e) => {
                warn!("{e}; starting with no profiles");
                ProfileStore::new()
            }
        }
    }

    pub fn save_keymap(&self, keymap: &KeyMapping) -> Result<(), StorageError> {
        write_json(&self.keymap_path(), keymap)
    }

    pub fn save_profiles(&self, profiles: &ProfileStore) -> Result<(), StorageError> {
        write_json(&self.profiles_path(), profiles)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(io_err)
}
