//! Default values for spoon configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// File Defaults
// ============================================================================

/// Folder (relative to a project root) holding spec files.
pub const DEFAULT_TEST_FOLDER: &str = "spec";

/// Directories whose files are never treated as specs.
pub const DEFAULT_IGNORED_DIRECTORIES: &[&str] = &["node_modules", "vendor", ".git"];

/// Spec file extensions (without leading dot).
pub const DEFAULT_SPEC_EXTENSIONS: &[&str] = &["js", "ts"];

// ============================================================================
// Command Defaults
// ============================================================================

/// Command that runs every spec in a file.
pub const DEFAULT_RUN_ALL_COMMAND: &str = "teaspoon {relative_path}";

/// Command that runs a single spec. Values are shell-quoted when rendered.
pub const DEFAULT_RUN_SINGLE_COMMAND: &str = "teaspoon {relative_path} --filter={test_name}";

/// Separator placed between a command and its after-callback.
pub const AFTER_CALLBACK_SEPARATOR: &str = " ; ";

// ============================================================================
// Environment Defaults
// ============================================================================

/// rbenv installed by Homebrew.
pub const BREW_RBENV_PATH: &str = "/usr/local/bin/rbenv";

/// rbenv installed from git, relative to the home directory.
pub const HOME_RBENV_PATH: &str = ".rbenv/bin/rbenv";

/// rvm's ruby wrapper, relative to the home directory.
pub const HOME_RVM_PATH: &str = ".rvm/bin/rvm-auto-ruby";

/// File whose presence in the project root enables `bundle exec`.
pub const GEMFILE_NAME: &str = "Gemfile";

// ============================================================================
// Storage Defaults
// ============================================================================

/// Default data directory name, created under the home directory.
pub const DEFAULT_DATA_DIR_NAME: &str = ".spoon";

/// Default last-run file name.
pub const DEFAULT_LAST_RUN_FILE: &str = "last-run.json";

// ============================================================================
// Config File Locations
// ============================================================================

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "spoon.toml";

/// Directory under the user config dir.
pub const USER_CONFIG_DIR: &str = "spoon";

/// File name under [`USER_CONFIG_DIR`].
pub const USER_CONFIG_FILE: &str = "config.toml";
