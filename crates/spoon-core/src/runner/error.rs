use std::path::PathBuf;
use thiserror::Error;

use crate::storage::StorageError;
use crate::template::TemplateError;

/// Errors that can occur while planning or running a test command.
#[derive(Debug, Error)]
pub enum RunError {
    /// The file is not a spec file.
    #[error("Only spec files under '{test_folder}' are supported: {file}")]
    Unsupported { file: String, test_folder: String },

    /// The cursor is not inside a `describe`/`it` block.
    #[error("No test name!")]
    NoTestName,

    /// "Run last" before anything ran.
    #[error("No test has been run yet")]
    NoLastRun,

    #[error("Refusing to run an empty command")]
    EmptyCommand,

    #[error("Could not determine the project root for {}", .0.display())]
    NoProjectRoot(PathBuf),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
