//! Test command planning and execution.
//!
//! The three user commands map onto planners:
//!
//! - run single test: [`TestRunner::plan_single`]
//! - run all tests in file: [`TestRunner::plan_all`]
//! - run last test: [`TestRunner::plan_last`]
//!
//! A [`PlannedRun`] is turned into the final shell line by
//! [`TestRunner::prepare`] and run by [`TestRunner::execute`].

mod error;
mod shell;

pub use error::RunError;
pub use shell::{ShellExecutor, SystemShell, EXIT_SIGNALED};

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{Config, AFTER_CALLBACK_SEPARATOR};
use crate::environment::{CommandPrefix, ToolLocator};
use crate::file::{current_line_number, Feature, TestFile};
use crate::locator::MatcherChain;
use crate::storage::{FileLastRunStore, LastRun, LastRunStore};

/// A test command and where to run it, before callbacks and prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRun {
    pub command: String,
    pub working_dir: PathBuf,
    /// Replayed from the last run; its after-callback is already attached.
    pub replay: bool,
}

impl PlannedRun {
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
            replay: false,
        }
    }
}

/// The shell line about to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommand {
    /// What gets stored as the last run (no environment prefix).
    pub recorded: String,
    /// What the shell executes.
    pub command: String,
    pub working_dir: PathBuf,
}

/// Plans and runs test commands for one invocation.
pub struct TestRunner {
    config: Config,
    store: Box<dyn LastRunStore>,
    shell: Box<dyn ShellExecutor>,
    tools: ToolLocator,
}

impl TestRunner {
    /// Runner with file storage, the system shell and tools from `$PATH`.
    pub fn new(config: Config) -> Self {
        let store = FileLastRunStore::with_config(&config.storage);
        Self {
            config,
            store: Box::new(store),
            shell: Box::new(SystemShell),
            tools: ToolLocator::from_env(),
        }
    }

    pub fn with_store(mut self, store: Box<dyn LastRunStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_shell(mut self, shell: Box<dyn ShellExecutor>) -> Self {
        self.shell = shell;
        self
    }

    pub fn with_tools(mut self, tools: ToolLocator) -> Self {
        self.tools = tools;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Plan a run of the test enclosing the character offset `cursor`.
    pub fn plan_single(&self, file: &TestFile, source: &str, cursor: usize) -> Result<PlannedRun, RunError> {
        self.require_spec(file)?;

        let matchers = MatcherChain::new(self.config.locator.options(file.dialect()));
        let test_name = matchers
            .find_first_match_in(source, cursor)
            .ok_or(RunError::NoTestName)?;
        info!(test_name = %test_name, "located test");

        let relative_path = self.relative_path(file)?;
        let line_number = current_line_number(source, cursor);
        let command = self
            .config
            .templates()
            .run_single(&relative_path, &test_name, line_number)?;

        Ok(PlannedRun::new(command, self.working_dir(file)?))
    }

    /// Plan a run of every test in `file`.
    pub fn plan_all(&self, file: &TestFile) -> Result<PlannedRun, RunError> {
        self.require_spec(file)?;

        let relative_path = self.relative_path(file)?;
        let command = self.config.templates().run_all(&relative_path)?;

        Ok(PlannedRun::new(command, self.working_dir(file)?))
    }

    /// Plan a replay of the last recorded run.
    pub fn plan_last(&self) -> Result<PlannedRun, RunError> {
        let last = self.store.load()?.ok_or(RunError::NoLastRun)?;
        Ok(PlannedRun {
            command: last.command,
            working_dir: last.working_dir,
            replay: true,
        })
    }

    /// Attach the after-callback and the environment prefix.
    pub fn prepare(&self, plan: &PlannedRun) -> Result<PreparedCommand, RunError> {
        if plan.command.trim().is_empty() {
            return Err(RunError::EmptyCommand);
        }

        let mut recorded = plan.command.clone();
        if !plan.replay {
            if let Some(after) = non_empty(&self.config.commands.after_callback) {
                recorded.push_str(AFTER_CALLBACK_SEPARATOR);
                recorded.push_str(after);
            }
        }

        let fallback_root = match self.store.load() {
            Ok(last) => last.map(|run| run.working_dir),
            Err(e) => {
                warn!("could not read last run: {e}");
                None
            }
        };
        let prefix = CommandPrefix::detect(
            &self.config.environment,
            &self.tools,
            Some(plan.working_dir.as_path()),
            fallback_root.as_deref(),
        );

        Ok(PreparedCommand {
            command: prefix.apply(&recorded),
            recorded,
            working_dir: plan.working_dir.clone(),
        })
    }

    /// Run the before-callback, record the run and execute it.
    /// Returns the command's exit code.
    pub fn execute(&self, plan: &PlannedRun) -> Result<i32, RunError> {
        let prepared = self.prepare(plan)?;

        if let Some(before) = non_empty(&self.config.commands.before_callback) {
            match self.shell.run(before, &prepared.working_dir) {
                Ok(0) => {}
                Ok(code) => warn!(code, "before callback `{before}` failed"),
                Err(e) => warn!("before callback `{before}` could not run: {e}"),
            }
        }

        self.store
            .save(&LastRun::new(&prepared.recorded, &prepared.working_dir))?;

        info!(
            command = %prepared.command,
            working_dir = %prepared.working_dir.display(),
            "running tests"
        );
        self.shell
            .run(&prepared.command, &prepared.working_dir)
            .map_err(|source| RunError::Spawn {
                command: prepared.command.clone(),
                source,
            })
    }

    fn require_spec(&self, file: &TestFile) -> Result<(), RunError> {
        if file.supports(Feature::RunTest) {
            return Ok(());
        }
        Err(RunError::Unsupported {
            file: file
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<unsaved buffer>".to_string()),
            test_folder: self.config.files.test_folder.clone(),
        })
    }

    fn relative_path(&self, file: &TestFile) -> Result<String, RunError> {
        file.relative_file_path().ok_or_else(|| RunError::Unsupported {
            file: file.path().map(|p| p.display().to_string()).unwrap_or_default(),
            test_folder: self.config.files.test_folder.clone(),
        })
    }

    fn working_dir(&self, file: &TestFile) -> Result<PathBuf, RunError> {
        file.project_root().ok_or_else(|| {
            RunError::NoProjectRoot(file.path().map(Path::to_path_buf).unwrap_or_default())
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
