use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading or writing the last-run record.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot access last run at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Last run at {} is not valid JSON: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot encode last run: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: &Path, source: serde_json::Error) -> Self {
        StorageError::Corrupt {
            path: path.to_path_buf(),
            source,
        }
    }
}
