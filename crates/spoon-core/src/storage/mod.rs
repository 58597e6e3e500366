mod error;
mod file;

pub use error::StorageError;
pub use file::FileLastRunStore;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The most recent test command, for "run last test".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastRun {
    /// Command as recorded, after-callback included, without the
    /// environment prefix.
    pub command: String,

    /// Directory the command ran in.
    pub working_dir: PathBuf,

    pub recorded_at: DateTime<Utc>,
}

impl LastRun {
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Trait for last-run storage backends.
pub trait LastRunStore {
    /// Replaces the stored last run.
    fn save(&self, run: &LastRun) -> Result<(), StorageError>;

    /// Loads the last run, if one was recorded.
    fn load(&self) -> Result<Option<LastRun>, StorageError>;

    /// Forgets the last run.
    fn clear(&self) -> Result<(), StorageError>;
}
