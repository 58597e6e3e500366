use std::fs;
use std::path::{Path, PathBuf};

use crate::config::StorageConfig;

use super::error::StorageError;
use super::{LastRun, LastRunStore};

/// File-based last-run storage.
///
/// ```text
/// ~/.spoon/
///   last-run.json      # {"command": ..., "working_dir": ..., "recorded_at": ...}
/// ```
pub struct FileLastRunStore {
    path: PathBuf,
}

impl FileLastRunStore {
    /// Creates a store with default config (`~/.spoon/last-run.json`).
    pub fn new() -> Self {
        Self::with_config(&StorageConfig::default())
    }

    /// Creates a store with custom configuration.
    pub fn with_config(config: &StorageConfig) -> Self {
        Self {
            path: config.last_run_path(),
        }
    }

    /// Creates a store at an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensures the parent directory exists.
    fn ensure_parent_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
            }
        }
        Ok(())
    }
}

impl Default for FileLastRunStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LastRunStore for FileLastRunStore {
    fn save(&self, run: &LastRun) -> Result<(), StorageError> {
        self.ensure_parent_dir()?;

        let json = serde_json::to_string_pretty(run)?;
        fs::write(&self.path, json).map_err(|e| StorageError::io(&self.path, e))?;

        Ok(())
    }

    fn load(&self) -> Result<Option<LastRun>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let run: LastRun =
            serde_json::from_str(&json).map_err(|e| StorageError::corrupt(&self.path, e))?;

        Ok(Some(run))
    }

    fn clear(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        }
        Ok(())
    }
}
