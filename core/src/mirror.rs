//! Write-through local copy of the todo list.
//!
//! The sync engine overwrites the mirror with the full list after every change
//! and reads it back only when the server cannot be reached at load time. The
//! mirror has one slot; there is no history and no merge.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::types::Todo;

/// File name used by `FileMirror::in_dir`; mirrors the single storage key.
pub const MIRROR_FILE: &str = "todos.json";

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("mirror I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("mirror does not hold a todo list: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("todo list could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

pub trait MirrorStore: Send + Sync {
    /// `Ok(None)` when nothing has been mirrored yet.
    fn read(&self) -> Result<Option<Vec<Todo>>, MirrorError>;

    /// Replaces the mirrored list wholesale.
    fn write(&self, todos: &[Todo]) -> Result<(), MirrorError>;
}

fn decode(raw: &str) -> Result<Option<Vec<Todo>>, MirrorError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw).map(Some).map_err(MirrorError::Corrupt)
}

fn encode(todos: &[Todo]) -> Result<String, MirrorError> {
    serde_json::to_string(todos).map_err(MirrorError::Encode)
}

/// In-process mirror holding the raw JSON string.
#[derive(Debug, Default)]
pub struct MemoryMirror {
    slot: Mutex<Option<String>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with arbitrary content, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl MirrorStore for MemoryMirror {
    fn read(&self) -> Result<Option<Vec<Todo>>, MirrorError> {
        match self.raw() {
            Some(raw) => decode(&raw),
            None => Ok(None),
        }
    }

    fn write(&self, todos: &[Todo]) -> Result<(), MirrorError> {
        let raw = encode(todos)?;
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw);
        Ok(())
    }
}

/// Mirror backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileMirror {
    path: PathBuf,
}

impl FileMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(MIRROR_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MirrorStore for FileMirror {
    fn read(&self) -> Result<Option<Vec<Todo>>, MirrorError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temp file and renames it over the target, so a
    /// reader never sees a half-written list.
    fn write(&self, todos: &[Todo]) -> Result<(), MirrorError> {
        let raw = encode(todos)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
