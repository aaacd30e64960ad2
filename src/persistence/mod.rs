//! Save/load of the player record
//!
//! - Versioned JSON envelope
//! - Atomic-ish writes (tmp file, then rename over the save)
//! - Missing save file is not an error

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progress::{ProgressSink, ProgressSnapshot};

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported save version {found}")]
    Version { found: u32 },
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    progress: ProgressSnapshot,
}

/// Player record stored as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved record. `Ok(None)` when nothing was saved yet.
    pub fn load(&self) -> Result<Option<ProgressSnapshot>, PersistenceError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let envelope: Envelope = serde_json::from_str(&json)?;
        if envelope.version != SAVE_VERSION {
            return Err(PersistenceError::Version {
                found: envelope.version,
            });
        }
        log::info!(
            "Loaded progress: level {}, score {}",
            envelope.progress.level,
            envelope.progress.score
        );
        Ok(Some(envelope.progress))
    }

    pub fn save(&self, snapshot: &ProgressSnapshot) -> Result<(), PersistenceError> {
        let envelope = Envelope {
            version: SAVE_VERSION,
            progress: *snapshot,
        };
        let json = serde_json::to_string_pretty(&envelope)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::info!("Saved progress cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl ProgressSink for JsonFileStore {
    fn record(&mut self, snapshot: &ProgressSnapshot) {
        if let Err(e) = self.save(snapshot) {
            log::warn!("Failed to save progress to {}: {e}", self.path.display());
        }
    }
}

/// Keeps every recorded snapshot in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub history: Vec<ProgressSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&ProgressSnapshot> {
        self.history.last()
    }
}

impl ProgressSink for MemoryStore {
    fn record(&mut self, snapshot: &ProgressSnapshot) {
        self.history.push(*snapshot);
    }
}
