use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String-keyed persistent storage, the shape of a browser localStorage.
/// `HistoryStore` depends on this seam instead of any concrete store so
/// tests can inject doubles.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), KvError>;
    fn remove(&mut self, key: &str) -> Result<(), KvError>;
}

/// In-memory store. Clones share the same map, so a second store opened
/// over a clone observes everything the first one persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KvError> {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), KvError> {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// JSON-file-backed store. The whole map is rewritten synchronously on
/// every mutation, matching the read-modify-write contract of the history
/// store. A failed write leaves the in-memory map as it was.
#[derive(Debug)]
pub struct FileKv {
    path: PathBuf,
    map: HashMap<String, String>,
}

impl FileKv {
    /// Open a store at `path`. A missing file starts empty; an unreadable
    /// one is treated the same and logged.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let map = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Storage file is not valid JSON, starting empty");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self { path, map }
    }

    fn flush(&self) -> Result<(), KvError> {
        let raw = serde_json::to_string_pretty(&self.map)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KvError> {
        let previous = self.map.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            match previous {
                Some(p) => self.map.insert(key.to_string(), p),
                None => self.map.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), KvError> {
        let previous = self.map.remove(key);
        if let Err(e) = self.flush() {
            if let Some(p) = previous {
                self.map.insert(key.to_string(), p);
            }
            return Err(e);
        }
        Ok(())
    }
}
