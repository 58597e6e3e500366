//! Shell execution.

use std::path::Path;
use std::process::{Command, Stdio};

/// Exit code reported when the child was terminated by a signal.
pub const EXIT_SIGNALED: i32 = 1;

/// Runs a shell command line in a working directory.
pub trait ShellExecutor {
    /// Run `command` through the shell and wait for it, returning its exit code.
    fn run(&self, command: &str, working_dir: &Path) -> std::io::Result<i32>;
}

/// The platform shell (`sh -c`, or `cmd /C` on Windows) with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShell;

impl SystemShell {
    fn command(command: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

impl ShellExecutor for SystemShell {
    fn run(&self, command: &str, working_dir: &Path) -> std::io::Result<i32> {
        let status = Self::command(command)
            .current_dir(working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        Ok(status.code().unwrap_or(EXIT_SIGNALED))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_exit_code_and_working_dir() {
        let temp = TempDir::new().unwrap();
        let shell = SystemShell;
        assert_eq!(shell.run("true", temp.path()).unwrap(), 0);
        assert_eq!(shell.run("exit 3", temp.path()).unwrap(), 3);

        shell.run("pwd > where.txt", temp.path()).unwrap();
        let written = std::fs::read_to_string(temp.path().join("where.txt")).unwrap();
        let expected = temp.path().canonicalize().unwrap();
        assert_eq!(Path::new(written.trim()).canonicalize().unwrap(), expected);
    }

    #[test]
    fn test_missing_working_dir_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(SystemShell.run("true", &temp.path().join("missing")).is_err());
    }
}
