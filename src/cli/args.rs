//! CLI argument definitions and parsing structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pushgate - run a repository's checks before `git push`
#[derive(Parser)]
#[command(name = "pushgate")]
#[command(about = "Git pre-push gate that runs configured checks before a push is allowed")]
#[command(long_about = r#"
pushgate reads the checks declared in .pushgate.yml (or .yaml, .json, .toml)
at the repository root and runs them. Any failing check fails the command,
which in turn blocks `git push` when pushgate is installed as the pre-push hook.

EXAMPLES:
  # Install the pre-push hook
  pushgate install

  # Run every check, four at a time, stopping after the first failure
  pushgate run --jobs 4 --fail-fast

  # Run two checks only, with their output echoed as it happens
  pushgate run --only fmt --only unit --verbose

  # Re-derive the diagnosis of a kept log
  pushgate explain .git/pushgate/logs/20240307_090501_01_unit.log

CONFIGURATION:
  Settings are layered with precedence: CLI flags > config file > defaults
  Use --config to point at a file outside the repository root
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the configured checks
    ///
    /// Exits 0 when no check failed (skipped checks do not count), 1 when at
    /// least one check failed.
    Run {
        /// Stop starting new checks after the first failure
        #[arg(long)]
        fail_fast: bool,

        /// Maximum number of checks running at once
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Directory for logs of failing checks
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Lines of output shown per failing check
        #[arg(long)]
        tail: Option<usize>,

        /// Run only the named check (repeatable)
        #[arg(long, value_name = "NAME")]
        only: Vec<String>,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Leave out the flavour line under a failed run
        #[arg(long)]
        no_banter: bool,
    },

    /// List configured checks, how they would run, and effective settings
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarise a saved check log
    Explain {
        /// Log file written by a failing check
        log: PathBuf,

        /// Lines of output to show
        #[arg(long)]
        tail: Option<usize>,
    },

    /// Install the git pre-push hook
    Install {
        /// Replace an existing hook not installed by pushgate
        #[arg(long)]
        force: bool,
    },

    /// Remove the pre-push hook installed by pushgate
    Uninstall,
}

/// Build the clap command (used for help rendering tests)
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
