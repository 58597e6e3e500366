//! Subcommand handlers.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use serde::Serialize;
use spoon_core::locator::line_column_to_offset;
use spoon_core::{Config, Dialect, Locator, PlannedRun, TestFile, TestRunner};
use tracing::debug;

use crate::{Cli, Commands, ConfigAction, CursorArgs};

/// Exit code when no test encloses the cursor.
const EXIT_NO_TEST: i32 = 1;

/// Run the parsed command line, returning the process exit code.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let explicit_config = cli.config.as_deref();

    match cli.command {
        Commands::Locate { file, cursor, json } => {
            let config = load_config(explicit_config, None)?;
            locate(&config, &file, &cursor, json)
        }
        Commands::RunSingle {
            file,
            cursor,
            roots,
            dry_run,
        } => {
            let roots = project_roots(roots)?;
            let config = load_config(explicit_config, roots.first().map(PathBuf::as_path))?;
            let file_path = absolute(&file)?;
            let source = read_source(&file_path)?;
            let offset = resolve_cursor(&source, &cursor)?;

            let spec = TestFile::classify(Some(&file_path), &config.files, &roots);
            let runner = TestRunner::new(config);
            let plan = runner.plan_single(&spec, &source, offset)?;
            run(&runner, &plan, dry_run)
        }
        Commands::RunAll {
            file,
            roots,
            dry_run,
        } => {
            let roots = project_roots(roots)?;
            let config = load_config(explicit_config, roots.first().map(PathBuf::as_path))?;
            let file_path = absolute(&file)?;

            let spec = TestFile::classify(Some(&file_path), &config.files, &roots);
            let runner = TestRunner::new(config);
            let plan = runner.plan_all(&spec)?;
            run(&runner, &plan, dry_run)
        }
        Commands::RunLast { dry_run } => {
            let config = load_config(explicit_config, None)?;
            let runner = TestRunner::new(config);
            let plan = runner.plan_last()?;
            run(&runner, &plan, dry_run)
        }
        Commands::Config { action } => {
            match action {
                ConfigAction::Init => {
                    let rendered = Config::default_config_string().wrap_err("Failed to render config")?;
                    print!("{rendered}");
                }
                ConfigAction::Show => {
                    let config = load_config(explicit_config, None)?;
                    let rendered = toml::to_string_pretty(&config).wrap_err("Failed to render config")?;
                    print!("{rendered}");
                }
            }
            Ok(0)
        }
    }
}

#[derive(Serialize)]
struct LocateOutput<'a> {
    file: &'a Path,
    offset: usize,
    test_name: Option<String>,
    labels: Vec<String>,
    error: Option<String>,
}

fn locate(config: &Config, file: &Path, cursor: &CursorArgs, json: bool) -> Result<i32> {
    let source = read_source(file)?;
    let offset = resolve_cursor(&source, cursor)?;
    let locator = Locator::new(config.locator.options(Dialect::from_path(file)));
    let located = locator.locate(&source, offset);

    if json {
        let output = match &located {
            Ok(path) => LocateOutput {
                file,
                offset,
                test_name: Some(path.render()),
                labels: path.labels().to_vec(),
                error: None,
            },
            Err(e) => LocateOutput {
                file,
                offset,
                test_name: None,
                labels: Vec::new(),
                error: Some(e.to_string()),
            },
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    match located {
        Ok(path) => {
            if !json {
                println!("{path}");
            }
            Ok(0)
        }
        Err(e) => {
            debug!("locate failed: {e}");
            if !json {
                eprintln!("No test name!");
            }
            Ok(EXIT_NO_TEST)
        }
    }
}

fn run(runner: &TestRunner, plan: &PlannedRun, dry_run: bool) -> Result<i32> {
    if dry_run {
        let prepared = runner.prepare(plan)?;
        println!("{}", prepared.command);
        println!("  in {}", prepared.working_dir.display());
        return Ok(0);
    }
    Ok(runner.execute(plan)?)
}

fn load_config(explicit: Option<&Path>, project_root: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load(project_root).wrap_err("Failed to load config")?,
    };
    Ok(config)
}

fn project_roots(roots: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    if roots.is_empty() {
        let cwd = std::env::current_dir().wrap_err("Failed to read the current directory")?;
        return Ok(vec![cwd]);
    }
    roots.iter().map(|root| absolute(root)).collect()
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().wrap_err("Failed to read the current directory")?;
    Ok(cwd.join(path))
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {}", path.display()))
}

/// Character offset from `--offset` or `--line`/`--column`.
fn resolve_cursor(source: &str, cursor: &CursorArgs) -> Result<usize> {
    match (cursor.offset, cursor.line) {
        (Some(offset), _) => Ok(offset),
        (None, Some(line)) => line_column_to_offset(source, line, cursor.column.unwrap_or(1))
            .ok_or_else(|| eyre!("Line {line} is outside the file")),
        (None, None) => bail!("Either --offset or --line is required"),
    }
}
