//! Core library for spoon: find the JavaScript spec under the cursor and
//! build, run and replay the shell command that executes it.

pub mod config;
pub mod environment;
pub mod file;
pub mod locator;
pub mod runner;
pub mod storage;
pub mod template;

pub use config::{Config, ConfigError};
pub use environment::{CommandPrefix, ToolLocator};
pub use file::{Feature, TestFile};
pub use locator::{locate_test_name, Dialect, LocateError, Locator, LocatorOptions, MatcherChain, ScanMode, TestPath};
pub use runner::{PlannedRun, PreparedCommand, RunError, ShellExecutor, SystemShell, TestRunner};
pub use storage::{FileLastRunStore, LastRun, LastRunStore, StorageError};
pub use template::{CommandTemplates, SettingKey, TemplateError};
