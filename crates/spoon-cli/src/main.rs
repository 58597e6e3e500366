use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "spoon")]
#[command(about = "Run the JavaScript spec under your cursor", long_about = None)]
struct Cli {
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs as JSON lines to stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file to use instead of searching for spoon.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Cursor position inside the spec file.
#[derive(Args, Debug, Clone)]
struct CursorArgs {
    /// 0-based character offset
    #[arg(long, conflicts_with = "line", required_unless_present = "line")]
    offset: Option<usize>,

    /// 1-based line
    #[arg(long)]
    line: Option<usize>,

    /// 1-based column on --line (default 1)
    #[arg(long, requires = "line")]
    column: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the name of the test enclosing the cursor
    Locate {
        /// Spec file
        file: PathBuf,

        #[command(flatten)]
        cursor: CursorArgs,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Run the test enclosing the cursor
    RunSingle {
        /// Spec file
        file: PathBuf,

        #[command(flatten)]
        cursor: CursorArgs,

        /// Open project folder (repeatable; defaults to the current directory)
        #[arg(long = "root", value_name = "DIR")]
        roots: Vec<PathBuf>,

        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Run every test in a spec file
    RunAll {
        /// Spec file
        file: PathBuf,

        /// Open project folder (repeatable; defaults to the current directory)
        #[arg(long = "root", value_name = "DIR")]
        roots: Vec<PathBuf>,

        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the last test command again
    RunLast {
        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the default configuration as TOML
    Init,
    /// Print the effective configuration
    Show,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    let code = commands::dispatch(cli)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
