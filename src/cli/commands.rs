//! CLI command implementations
//!
//! Each `execute_*` function handles one subcommand and returns the exit code
//! to use when it completed normally. Errors that should map to a specific
//! exit code are wrapped in [`PushgateError`].

use anyhow::{Context, Result};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pushgate_classify::{classify, headline};
use pushgate_config::{CliOverrides, Config, DEFAULT_TAIL_LINES};
use pushgate_engine::{
    Applicability, Dispatcher, NoProgress, ProgressSink, RunOptions, SystemProbe, evaluate,
};
use pushgate_runner::resolve;
use pushgate_utils::error::{ConfigError, PushgateError};
use pushgate_utils::exit_codes::ExitCode;
use pushgate_utils::logging::use_color;
use pushgate_utils::paths::find_repo_root;
use pushgate_utils::text::tail_lines;

use crate::banter::{self, SystemRandom};
use crate::hooks::{self, InstallOutcome, UninstallOutcome};
use crate::render::{JsonRun, TerminalProgress, render_report};

/// Wrap a typed error so `run()` can map it to its exit code.
fn fatal(err: impl Into<PushgateError>) -> anyhow::Error {
    anyhow::Error::new(err.into())
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to get current directory")
}

// ============================================================================
// Run Command
// ============================================================================

/// Flags of `pushgate run`.
pub struct RunArgs {
    pub fail_fast: bool,
    pub jobs: Option<usize>,
    pub log_dir: Option<PathBuf>,
    pub tail: Option<usize>,
    pub only: Vec<String>,
    pub json: bool,
    pub no_banter: bool,
}

/// Execute the configured checks
pub async fn execute_run_command(
    config_path: Option<PathBuf>,
    verbose: bool,
    args: RunArgs,
) -> Result<ExitCode> {
    let overrides = CliOverrides {
        config_path,
        fail_fast: args.fail_fast.then_some(true),
        max_parallel: args.jobs,
        log_dir: args.log_dir,
        tail_lines: args.tail,
    };
    let config = Config::discover_from(&current_dir()?, &overrides).map_err(fatal)?;
    let checks = config.select(&args.only).map_err(fatal)?;
    let options = RunOptions::from_settings(&config.settings, verbose);

    let color = use_color();
    let progress: Arc<dyn ProgressSink> = if args.json {
        Arc::new(NoProgress)
    } else {
        Arc::new(TerminalProgress::new(checks.len(), color))
    };

    let report = Dispatcher::new(&config.repo_root, options)
        .run_all(&checks, progress)
        .await
        .map_err(fatal)?;

    if args.json {
        let document = serde_json::to_string_pretty(&JsonRun::new(&report))
            .context("Failed to serialize run report")?;
        println!("{document}");
    } else {
        println!();
        print!("{}", render_report(&report, config.settings.tail_lines, color));
        if !args.no_banter {
            let mut rng = SystemRandom::new();
            if let Some(first) = report.failures.first() {
                let summary = report.tails.get(first).map(|t| headline(t)).unwrap_or_default();
                println!("{}", banter::failure_line(first, &summary, &mut rng));
            } else if !report.skipped.is_empty() {
                println!("{}", banter::skip_only_line(&mut rng));
            }
        }
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::CHECKS_FAILED
    })
}

// ============================================================================
// List Command
// ============================================================================

/// Show configured checks, their resolved invocation and applicability
pub fn execute_list_command(config_path: Option<PathBuf>, json: bool) -> Result<ExitCode> {
    let overrides = CliOverrides {
        config_path,
        ..CliOverrides::default()
    };
    let config = Config::discover_from(&current_dir()?, &overrides).map_err(fatal)?;
    let sources: BTreeMap<_, _> = config.source_attribution.iter().collect();

    let mut entries = Vec::with_capacity(config.checks.len());
    for spec in &config.checks {
        let cwd = match &spec.working_directory {
            Some(dir) => config.repo_root.join(dir),
            None => config.repo_root.clone(),
        };
        let applicability = evaluate(spec, &cwd, &SystemProbe);
        let invocation = resolve(
            spec.shell.as_deref(),
            &spec.command,
            config.settings.fallback_shell.as_deref(),
        );
        entries.push((spec, cwd, applicability, invocation));
    }

    if json {
        let checks: Vec<_> = entries
            .iter()
            .map(|(spec, cwd, applicability, invocation)| {
                let skip_reason = match applicability {
                    Applicability::Run => None,
                    Applicability::Skip(reason) => Some(reason.as_str()),
                };
                json!({
                    "name": spec.name,
                    "command": spec.command,
                    "cwd": cwd,
                    "invocation": invocation,
                    "applicable": skip_reason.is_none(),
                    "skip_reason": skip_reason,
                })
            })
            .collect();
        let document = json!({
            "config": config.source_path,
            "repo_root": config.repo_root,
            "settings": config.settings,
            "sources": sources,
            "checks": checks,
        });
        let text =
            serde_json::to_string_pretty(&document).context("Failed to serialize check list")?;
        println!("{text}");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Configuration: {}", config.source_path.display());
    for (key, source) in &sources {
        println!("  {key} ({source})");
    }
    println!();
    for (spec, cwd, applicability, invocation) in &entries {
        println!("{}", spec.name);
        println!("  command: {}", spec.command);
        println!("  runs as: {invocation}");
        if cwd != &config.repo_root {
            println!("  cwd:     {}", cwd.display());
        }
        match applicability {
            Applicability::Run => println!("  status:  ready"),
            Applicability::Skip(reason) => println!("  status:  skip ({reason})"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Explain Command
// ============================================================================

/// Re-derive the diagnosis and output tail from a kept log
pub fn execute_explain_command(log: &Path, tail: Option<usize>) -> Result<ExitCode> {
    let raw = std::fs::read(log)
        .with_context(|| format!("Failed to read log file {}", log.display()))?;
    let output = String::from_utf8_lossy(&raw);

    match classify(&output) {
        Some(diagnosis) => {
            println!("{}", diagnosis.headline);
            println!("why: {}", diagnosis.why);
        }
        None => println!("No known failure pattern found."),
    }

    let excerpt = tail_lines(&output, tail.unwrap_or(DEFAULT_TAIL_LINES));
    if !excerpt.is_empty() {
        println!();
        for line in excerpt.lines() {
            println!("  {line}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Hook Commands
// ============================================================================

fn repo_root() -> Result<PathBuf> {
    let start = current_dir()?;
    find_repo_root(&start).ok_or_else(|| {
        fatal(ConfigError::NoRepository {
            start: start.display().to_string(),
        })
    })
}

/// Install the pre-push hook
pub fn execute_install_command(force: bool) -> Result<ExitCode> {
    let root = repo_root()?;
    let program = std::env::current_exe()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "pushgate".to_string());

    match hooks::install(&root, &program, force).map_err(fatal)? {
        InstallOutcome::Installed(path) => {
            println!("✓ Installed pre-push hook at {}", path.display());
        }
        InstallOutcome::Updated(path) => {
            println!("✓ Updated pre-push hook at {}", path.display());
        }
        InstallOutcome::Replaced(path) => {
            println!("✓ Replaced existing pre-push hook at {}", path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Remove the pre-push hook
pub fn execute_uninstall_command() -> Result<ExitCode> {
    let root = repo_root()?;
    match hooks::uninstall(&root).map_err(fatal)? {
        UninstallOutcome::Removed(path) => {
            println!("✓ Removed pre-push hook {}", path.display());
        }
        UninstallOutcome::NotInstalled => println!("No pushgate pre-push hook installed."),
    }
    Ok(ExitCode::SUCCESS)
}
