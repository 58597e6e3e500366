//! Configuration management for spoon.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `spoon.toml` file
//! 3. User config `~/.config/spoon/config.toml`
//! 4. Built-in defaults (lowest priority)
//!
//! A [`Config`] is built once per command invocation and passed down
//! explicitly; nothing reads settings from globals.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::locator::{Dialect, LocatorOptions, ScanMode};
use crate::template::CommandTemplates;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which files count as specs.
    pub files: FilesConfig,

    /// Shell command templates and callbacks.
    pub commands: CommandsConfig,

    /// Ruby environment detection.
    pub environment: EnvironmentConfig,

    /// Test locator behaviour.
    pub locator: LocatorConfig,

    /// Last-run persistence.
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `<project_root>/spoon.toml`, then `./spoon.toml`
    /// 2. `~/.config/spoon/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(root) = project_root {
            candidates.push(root.join(PROJECT_CONFIG_FILE));
        }
        candidates.push(PathBuf::from(PROJECT_CONFIG_FILE));
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE));
        }

        for candidate in candidates {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "loading config");
                return Self::from_file(&candidate);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(folder) = std::env::var("SPOON_TEST_FOLDER") {
            self.files.test_folder = folder;
        }

        if let Ok(command) = std::env::var("SPOON_RUN_ALL_COMMAND") {
            self.commands.run_all = command;
        }
        if let Ok(command) = std::env::var("SPOON_RUN_SINGLE_COMMAND") {
            self.commands.run_single = command;
        }
        if let Ok(callback) = std::env::var("SPOON_BEFORE_CALLBACK") {
            self.commands.before_callback = Some(callback);
        }
        if let Ok(callback) = std::env::var("SPOON_AFTER_CALLBACK") {
            self.commands.after_callback = Some(callback);
        }

        if let Ok(scan) = std::env::var("SPOON_LOCATOR_SCAN") {
            match scan.parse() {
                Ok(mode) => self.locator.scan = mode,
                Err(e) => warn!("ignoring SPOON_LOCATOR_SCAN: {e}"),
            }
        }

        if let Ok(dir) = std::env::var("SPOON_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Reject settings that would make every later step fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.files.test_folder.trim().is_empty() {
            return Err(ConfigError::Invalid("files.test_folder must not be empty".to_string()));
        }
        if self.files.extensions.is_empty() {
            return Err(ConfigError::Invalid("files.extensions must not be empty".to_string()));
        }
        self.templates()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Typed accessors for the command templates.
    pub fn templates(&self) -> CommandTemplates<'_> {
        CommandTemplates::new(&self.commands)
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&Config::default())?)
    }
}

/// Spec file selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Folder name that marks a path as a spec path.
    pub test_folder: String,

    /// Directories whose files are never specs.
    pub ignored_directories: Vec<String>,

    /// Spec file extensions (without leading dot).
    pub extensions: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            test_folder: DEFAULT_TEST_FOLDER.to_string(),
            ignored_directories: DEFAULT_IGNORED_DIRECTORIES.iter().map(|s| s.to_string()).collect(),
            extensions: DEFAULT_SPEC_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Shell command templates.
///
/// Templates use `{name}` placeholders; see [`crate::template`] for the
/// placeholders each command accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Runs every spec in a file. Placeholders: `relative_path`.
    pub run_all: String,

    /// Runs one spec. Placeholders: `relative_path`, `test_name`, `line_number`.
    pub run_single: String,

    /// Shell command run before each test command.
    pub before_callback: Option<String>,

    /// Shell command chained after each test command.
    pub after_callback: Option<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            run_all: DEFAULT_RUN_ALL_COMMAND.to_string(),
            run_single: DEFAULT_RUN_SINGLE_COMMAND.to_string(),
            before_callback: None,
            after_callback: None,
        }
    }
}

/// Ruby environment detection switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub check_for_rbenv: bool,
    pub check_for_rvm: bool,
    pub check_for_bundler: bool,
    pub check_for_spring: bool,
}

/// Test locator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// `textual` (first header after the anchor) or `structural`.
    pub scan: ScanMode,

    /// Also accept `() => {` bodies.
    pub arrow_functions: bool,
}

impl LocatorConfig {
    pub fn options(&self, dialect: Dialect) -> LocatorOptions {
        LocatorOptions {
            dialect,
            scan: self.scan,
            arrow_functions: self.arrow_functions,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for spoon data (default: `~/.spoon`).
    pub data_dir: Option<PathBuf>,

    /// Last-run file name.
    pub last_run_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Resolved against the home directory
            last_run_file: DEFAULT_LAST_RUN_FILE.to_string(),
        }
    }
}

impl StorageConfig {
    /// Get the data directory, falling back to `~/.spoon` (or `./.spoon`
    /// when there is no home directory).
    pub fn data_dir_or_default(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_DATA_DIR_NAME)
        })
    }

    /// Get the full path to the last-run file.
    pub fn last_run_path(&self) -> PathBuf {
        self.data_dir_or_default().join(&self.last_run_file)
    }
}
