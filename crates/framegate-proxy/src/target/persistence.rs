//! Durable storage for the proxy target.
//!
//! The persisted record is a single JSON object, `{"target_url": "..."}` or
//! `{"target_url": null}`, overwritten on every change.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("target state I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("target state in {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Storage backend for the single proxy target value.
pub trait TargetPersistence: Send + Sync {
    /// Read the stored record. A store that has never been written yields
    /// `None`; a cleared target is `Some` record with no URL.
    fn load(&self) -> Result<Option<TargetRecord>, PersistError>;

    /// Overwrite the stored target.
    fn save(&self, target: Option<&str>) -> Result<(), PersistError>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub target_url: Option<String>,
}

/// Stores the target as a small JSON file.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn json_error(&self, source: serde_json::Error) -> PersistError {
        PersistError::Json {
            path: self.path.clone(),
            source,
        }
    }
}

impl TargetPersistence for JsonFilePersistence {
    fn load(&self) -> Result<Option<TargetRecord>, PersistError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No target state at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let record = serde_json::from_str(&contents).map_err(|e| self.json_error(e))?;
        Ok(Some(record))
    }

    fn save(&self, target: Option<&str>) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let record = TargetRecord {
            target_url: target.map(str::to_string),
        };
        let json = serde_json::to_string(&record).map_err(|e| self.json_error(e))?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

/// In-memory only; nothing survives a restart.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPersistence;

impl TargetPersistence for NoOpPersistence {
    fn load(&self) -> Result<Option<TargetRecord>, PersistError> {
        Ok(None)
    }

    fn save(&self, _target: Option<&str>) -> Result<(), PersistError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
