//! Cloud-save backends and the on-disk save record.
//!
//! The ledger only ever sees the [`CloudStore`] trait: a blob goes in, a blob
//! comes out.  [`FileCloudStore`] keeps that blob as a single file under the
//! save directory; [`MemoryCloudStore`] keeps it in memory for tests and for
//! runs where no writable directory exists.

use crate::error::{PetError, PetResult};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Serialized form of the points ledger.
///
/// ```json
/// { "points": 12, "lastSaved": 1760000000 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveRecord {
    pub points: u64,
    #[serde(rename = "lastSaved")]
    pub last_saved: u64,
}

impl SaveRecord {
    pub fn new(points: u64) -> Self {
        Self {
            points,
            last_saved: current_unix_timestamp(),
        }
    }

    pub fn encode(&self) -> PetResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| PetError::Encode {
            reason: err.to_string(),
        })
    }

    pub fn decode(blob: &str) -> PetResult<Self> {
        serde_json::from_str(blob).map_err(|err| PetError::MalformedSave {
            reason: err.to_string(),
        })
    }
}

pub fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Remote-storage abstraction used by the points ledger.
///
/// Backends log their own failures; the boolean / `Option` results only tell
/// the caller whether anything happened.
pub trait CloudStore: Send + Sync {
    fn is_available(&self) -> bool;

    /// Store `blob`, replacing any previous one.  Returns `true` on success.
    fn save(&mut self, blob: &str) -> bool;

    /// Fetch the stored blob.  `None` when nothing has been saved yet or the
    /// read failed.
    fn load(&mut self) -> Option<String>;

    /// One-line diagnostic description (backend, location, quota).
    fn describe(&self) -> String;
}

// ── File backend ──────────────────────────────────────────────────────────────

/// Stores the blob as `<dir>/<file_name>`.
#[derive(Debug, Clone)]
pub struct FileCloudStore {
    dir: PathBuf,
    file_name: String,
}

impl FileCloudStore {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    pub fn try_save(&self, blob: &str) -> PetResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| PetError::StoreIo {
            context: format!("failed to create save dir {}", self.dir.display()),
            source,
        })?;

        let path = self.path();
        fs::write(&path, blob).map_err(|source| PetError::StoreIo {
            context: format!("failed to write {}", path.display()),
            source,
        })?;

        // Confirm the full blob landed.
        let written = fs::metadata(&path)
            .map_err(|source| PetError::StoreIo {
                context: format!("failed to stat {}", path.display()),
                source,
            })?
            .len() as usize;
        if written != blob.len() {
            return Err(PetError::ReadMismatch {
                expected: blob.len(),
                got: written,
            });
        }
        Ok(())
    }

    pub fn try_load(&self) -> PetResult<Option<String>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let expected = fs::metadata(&path)
            .map_err(|source| PetError::StoreIo {
                context: format!("failed to stat {}", path.display()),
                source,
            })?
            .len() as usize;
        if expected == 0 {
            return Ok(None);
        }

        let contents = read_file(&path)?;
        if contents.len() != expected {
            return Err(PetError::ReadMismatch {
                expected,
                got: contents.len(),
            });
        }
        Ok(Some(contents))
    }
}

fn read_file(path: &Path) -> PetResult<String> {
    fs::read_to_string(path).map_err(|source| PetError::StoreIo {
        context: format!("failed to read {}", path.display()),
        source,
    })
}

impl CloudStore for FileCloudStore {
    fn is_available(&self) -> bool {
        // The directory is created lazily on first save.
        !self.file_name.is_empty()
    }

    fn save(&mut self, blob: &str) -> bool {
        match self.try_save(blob) {
            Ok(()) => true,
            Err(err) => {
                warn!("Cloud save failed: {}", err);
                false
            }
        }
    }

    fn load(&mut self) -> Option<String> {
        match self.try_load() {
            Ok(Some(blob)) => Some(blob),
            Ok(None) => {
                info!("No cloud save found at {}", self.path().display());
                None
            }
            Err(err) => {
                error!("Cloud load failed: {}", err);
                None
            }
        }
    }

    fn describe(&self) -> String {
        let path = self.path();
        let size = fs::metadata(&path).map(|m| m.len()).ok();
        match size {
            Some(bytes) => format!("file store at {} ({} bytes used)", path.display(), bytes),
            None => format!("file store at {} (empty)", path.display()),
        }
    }
}

// ── In-memory backend ─────────────────────────────────────────────────────────

/// Keeps the blob in memory.  Clones share the same slot, so a test can hold
/// one handle while the ledger owns another.
#[derive(Debug, Clone)]
pub struct MemoryCloudStore {
    blob: Arc<Mutex<Option<String>>>,
    available: bool,
}

impl Default for MemoryCloudStore {
    fn default() -> Self {
        Self {
            blob: Arc::new(Mutex::new(None)),
            available: true,
        }
    }
}

impl MemoryCloudStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that reports itself as not initialised.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        let store = Self::default();
        store.set_blob(Some(blob.into()));
        store
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn set_blob(&self, blob: Option<String>) {
        if let Ok(mut slot) = self.blob.lock() {
            *slot = blob;
        }
    }
}

impl CloudStore for MemoryCloudStore {
    fn is_available(&self) -> bool {
        self.available
    }

    fn save(&mut self, blob: &str) -> bool {
        if !self.available {
            return false;
        }
        match self.blob.lock() {
            Ok(mut slot) => {
                *slot = Some(blob.to_string());
                true
            }
            Err(_) => false,
        }
    }

    fn load(&mut self) -> Option<String> {
        if !self.available {
            return None;
        }
        self.blob()
    }

    fn describe(&self) -> String {
        match self.blob() {
            Some(blob) => format!("memory store ({} bytes used)", blob.len()),
            None => "memory store (empty)".to_string(),
        }
    }
}
