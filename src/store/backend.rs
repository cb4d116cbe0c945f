//! Pluggable persistence backends for store snapshots.
//!
//! The store's contract is logical: a create-populate-close-open(read)
//! round trip reproduces every value written. How the snapshot bytes are
//! persisted is the backend's business; the default is a plain file, and an
//! in-memory backend serves tests and transient pipelines.

use crate::exchange_error::MeshExchangeError;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Byte-level persistence for one store.
pub trait Backend {
    /// Whether a persisted snapshot already exists.
    fn exists(&self) -> bool;

    /// Loads the persisted snapshot bytes.
    fn load(&mut self) -> Result<Vec<u8>, MeshExchangeError>;

    /// Persists the snapshot bytes, replacing any previous content.
    fn save(&mut self, bytes: &[u8]) -> Result<(), MeshExchangeError>;

    /// Location description used in error reporting.
    fn location(&self) -> PathBuf;
}

/// File-backed persistence (the default).
#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Backend persisting to `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Backend for FileBackend {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&mut self) -> Result<Vec<u8>, MeshExchangeError> {
        if !self.path.exists() {
            return Err(MeshExchangeError::FileNotFound(self.path.clone()));
        }
        Ok(std::fs::read(&self.path)?)
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), MeshExchangeError> {
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

/// In-memory persistence sharing its buffer across clones.
///
/// Cloning the backend yields a handle onto the same buffer, so a store can
/// be created, closed, and reopened from another clone within one process.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    buffer: Rc<RefCell<Option<Vec<u8>>>>,
}

impl MemoryBackend {
    /// Fresh, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn exists(&self) -> bool {
        self.buffer.borrow().is_some()
    }

    fn load(&mut self) -> Result<Vec<u8>, MeshExchangeError> {
        self.buffer
            .borrow()
            .clone()
            .ok_or_else(|| MeshExchangeError::FileNotFound(self.location()))
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), MeshExchangeError> {
        *self.buffer.borrow_mut() = Some(bytes.to_vec());
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from(":memory:")
    }
}
