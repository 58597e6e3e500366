//! Ruby environment detection.
//!
//! Teaspoon runs through Ruby, so the test command may need to go through a
//! version manager (rbenv or rvm), spring, and/or bundler. The result is a
//! [`CommandPrefix`] put in front of every command.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{
    EnvironmentConfig, BREW_RBENV_PATH, GEMFILE_NAME, HOME_RBENV_PATH, HOME_RVM_PATH,
};

/// Where to look for executables.
#[derive(Debug, Clone, Default)]
pub struct ToolLocator {
    home: Option<PathBuf>,
    path_dirs: Vec<PathBuf>,
    brew_rbenv: PathBuf,
}

impl ToolLocator {
    /// Locator for the current process: `$HOME` and `$PATH`.
    pub fn from_env() -> Self {
        let path_dirs = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();
        Self::new(dirs::home_dir(), path_dirs)
    }

    pub fn new(home: Option<PathBuf>, path_dirs: Vec<PathBuf>) -> Self {
        Self {
            home,
            path_dirs,
            brew_rbenv: PathBuf::from(BREW_RBENV_PATH),
        }
    }

    /// Override the Homebrew rbenv location.
    pub fn with_brew_rbenv(mut self, path: impl Into<PathBuf>) -> Self {
        self.brew_rbenv = path.into();
        self
    }

    /// First file named `name` on the search path.
    pub fn which(&self, name: &str) -> Option<PathBuf> {
        self.path_dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// rbenv binary: Homebrew's if present, else the one on `PATH`, else
    /// `~/.rbenv/bin/rbenv`.
    pub fn rbenv(&self) -> Option<PathBuf> {
        if self.brew_rbenv.is_file() {
            return Some(self.brew_rbenv.clone());
        }
        if let Some(found) = self.which("rbenv") {
            return Some(found);
        }
        self.home.as_ref().map(|home| home.join(HOME_RBENV_PATH))
    }

    pub fn rvm(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join(HOME_RVM_PATH))
    }
}

/// Words put in front of a test command, e.g. `rbenv exec bundle exec`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPrefix {
    parts: Vec<String>,
}

impl CommandPrefix {
    /// Detect the prefix for a project.
    ///
    /// `project_root` decides whether bundler applies; when it is not a
    /// directory, `fallback_root` (the last run's working directory) is
    /// checked instead.
    pub fn detect(
        config: &EnvironmentConfig,
        tools: &ToolLocator,
        project_root: Option<&Path>,
        fallback_root: Option<&Path>,
    ) -> Self {
        let mut prefix = Self::default();

        if config.check_for_rbenv || config.check_for_rvm {
            prefix.version_manager(config, tools);
        }

        if config.check_for_spring {
            prefix.parts.push("spring".to_string());
        }

        if config.check_for_bundler {
            let root = project_root
                .filter(|root| root.is_dir())
                .or(fallback_root);
            if root.is_some_and(|root| root.join(GEMFILE_NAME).is_file()) {
                prefix.parts.push("bundle exec".to_string());
            }
        }

        debug!(prefix = %prefix, "detected command prefix");
        prefix
    }

    fn version_manager(&mut self, config: &EnvironmentConfig, tools: &ToolLocator) {
        if config.check_for_rbenv {
            if let Some(rbenv) = tools.rbenv().filter(|p| is_executable(p)) {
                self.parts.push(format!("{} exec", rbenv.display()));
                return;
            }
        }
        if config.check_for_rvm {
            if let Some(rvm) = tools.rvm().filter(|p| is_executable(p)) {
                self.parts.push(format!("{} -S", rvm.display()));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// `command` with the prefix in front.
    pub fn apply(&self, command: &str) -> String {
        if self.is_empty() {
            command.to_string()
        } else {
            format!("{} {}", self, command)
        }
    }
}

impl std::fmt::Display for CommandPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.parts.join(" "))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
