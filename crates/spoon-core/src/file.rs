//! Spec file classification.
//!
//! Decides whether a path is a runnable spec file and splits it into the
//! project root and the path relative to it:
//!
//! ```text
//! /work/app/spec/javascripts/models/user_spec.js
//! └──┬────┘ └─┬┘ └───────────────┬────────────┘
//! project root │   rest
//!          partition folder
//!
//! relative path: spec/javascripts/models/user_spec.js
//! ```

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use regex::Regex;
use tracing::warn;

use crate::config::FilesConfig;
use crate::locator::{line_number_at, Dialect};

/// What a file can be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    RunTest,
}

/// A classified file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestFile {
    /// An unsaved buffer with no path.
    Anonymous,
    /// A file outside the spec folder.
    Plain { path: PathBuf },
    /// A spec file below the partition folder.
    Unit { path: PathBuf, partition_folder: String },
}

impl TestFile {
    /// Classify `path` given the open project folders.
    pub fn classify(path: Option<&Path>, files: &FilesConfig, project_folders: &[PathBuf]) -> Self {
        let Some(path) = path else {
            return Self::Anonymous;
        };

        if is_spec_path(path, files) {
            let partition_folder = find_partition_folder(path, project_folders, &files.test_folder);
            Self::Unit {
                path: path.to_path_buf(),
                partition_folder,
            }
        } else {
            Self::Plain {
                path: path.to_path_buf(),
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Anonymous => None,
            Self::Plain { path } | Self::Unit { path, .. } => Some(path),
        }
    }

    pub fn features(&self) -> &'static [Feature] {
        match self {
            Self::Unit { .. } => &[Feature::RunTest],
            _ => &[],
        }
    }

    pub fn supports(&self, feature: Feature) -> bool {
        self.features().contains(&feature)
    }

    pub fn dialect(&self) -> Dialect {
        self.path().map(Dialect::from_path).unwrap_or_default()
    }

    /// Directory the test command runs in.
    pub fn project_root(&self) -> Option<PathBuf> {
        match self {
            Self::Anonymous => None,
            Self::Plain { path } => path.parent().map(Path::to_path_buf),
            Self::Unit { .. } => self.find_project_root(),
        }
    }

    /// Path prefix before `/<partition>/`.
    pub fn find_project_root(&self) -> Option<PathBuf> {
        let Self::Unit { path, partition_folder } = self else {
            return None;
        };
        let (root, _) = split_at_partition(path, partition_folder);
        Some(PathBuf::from(root))
    }

    /// `<partition>/<rest>`, the path handed to the test command.
    pub fn relative_file_path(&self) -> Option<String> {
        let Self::Unit { path, partition_folder } = self else {
            return None;
        };
        let (_, rest) = split_at_partition(path, partition_folder);
        Some(format!("{partition_folder}{MAIN_SEPARATOR}{rest}"))
    }
}

/// 1-based line of the cursor, for templates that want `{line_number}`.
pub fn current_line_number(text: &str, cursor: usize) -> usize {
    line_number_at(text, cursor)
}

fn is_spec_path(path: &Path, files: &FilesConfig) -> bool {
    let path_str = path.to_string_lossy();

    let in_ignored = path.components().any(|c| {
        files
            .ignored_directories
            .iter()
            .any(|ignored| c.as_os_str() == ignored.as_str())
    });
    if in_ignored {
        return false;
    }

    let extensions = files
        .extensions
        .iter()
        .map(|e| regex::escape(e.trim_start_matches('.')))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"{}.+\.(?:{})$", regex::escape(&files.test_folder), extensions);

    match Regex::new(&pattern) {
        Ok(re) => re.is_match(&path_str),
        Err(e) => {
            warn!("invalid spec path pattern {pattern}: {e}");
            false
        }
    }
}

/// First path component below the project folder containing `path`, or
/// `default` when no project folder contains it.
pub fn find_partition_folder(path: &Path, project_folders: &[PathBuf], default: &str) -> String {
    project_folders
        .iter()
        .find_map(|folder| {
            let relative = path.strip_prefix(folder).ok()?;
            let first = relative.components().next()?;
            // A file directly inside the project folder has no partition.
            if relative.components().nth(1).is_none() {
                return None;
            }
            Some(first.as_os_str().to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| default.to_string())
}

/// Split around the first `/<partition>/`. Without a match the root is
/// the whole path and the rest is empty.
fn split_at_partition(path: &Path, partition_folder: &str) -> (String, String) {
    let path_str = path.to_string_lossy();
    let needle = format!("{MAIN_SEPARATOR}{partition_folder}{MAIN_SEPARATOR}");
    match path_str.find(&needle) {
        Some(at) => (
            path_str[..at].to_string(),
            path_str[at + needle.len()..].to_string(),
        ),
        None => (path_str.into_owned(), String::new()),
    }
}
