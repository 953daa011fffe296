//! pushgate - run a repository's checks before `git push` lets anything out
//!
//! pushgate reads a list of checks from `.pushgate.yml` (or `.yaml`, `.json`,
//! `.toml`) at the repository root, runs them through the right shell, and
//! blocks the push when any of them fails. Passing checks leave nothing
//! behind; a failing check keeps one log file and is summarised with a
//! short diagnosis of what went wrong.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Install the pre-push hook in the current repository
//! pushgate install
//!
//! # Run the checks by hand
//! pushgate run --jobs 4
//!
//! # Re-read a kept log later
//! pushgate explain .git/pushgate/logs/20260101_120000_01_unit.log
//! ```
//!
//! # Library
//!
//! The workspace crates are re-exported so the engine can be embedded:
//!
//! ```rust,no_run
//! use pushgate::config::{CliOverrides, Config};
//! use pushgate::engine::{Dispatcher, NoProgress, RunOptions};
//! use std::sync::Arc;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::discover(&CliOverrides::default())?;
//! let options = RunOptions::from_settings(&config.settings, false);
//! let report = Dispatcher::new(&config.repo_root, options)
//!     .run_all(&config.checks, Arc::new(NoProgress))
//!     .await?;
//! println!("{} failed", report.failures.len());
//! # Ok(())
//! # }
//! ```

pub mod banter;
pub mod cli;
pub mod hooks;
pub mod render;

pub use pushgate_classify as classify;
pub use pushgate_config as config;
pub use pushgate_engine as engine;
pub use pushgate_runner as runner;
pub use pushgate_utils as utils;

pub use pushgate_utils::error::PushgateError;
pub use pushgate_utils::exit_codes::ExitCode;
