//! Check dispatcher.
//!
//! For each check, in declaration order: skip evaluation, working directory,
//! shell resolution, environment merge and PATH adaptation, log file, spawn
//! and capture, log finish. Checks run one at a time unless `max_parallel`
//! allows a bounded pool of concurrent checks.

use crate::progress::{CheckStatus, ProgressSink};
use crate::report::RunReport;
use crate::skip::{Applicability, HostProbe, SystemProbe, evaluate};
use pushgate_config::{CheckSpec, Settings};
use pushgate_runner::log_file::log_path;
use pushgate_runner::{
    CheckLog, DEFAULT_CAPTURE_BYTES, ExecutionOutcome, adapt_environment, merged_environment,
    resolve, run_captured,
};
use pushgate_utils::error::DispatchError;
use pushgate_utils::logging::{check_span, log_check_finished};
use pushgate_utils::paths::{default_log_dir, ensure_dir_all};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info};

/// Caller-chosen execution options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Echo check output to our stderr as it arrives.
    pub verbose: bool,
    /// Overrides the default log directory.
    pub log_dir: Option<PathBuf>,
    pub fallback_shell: Option<String>,
    /// Stop starting checks after the first failure.
    pub fail_fast: bool,
    /// `0` and `1` both mean sequential.
    pub max_parallel: usize,
    pub capture_bytes: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            log_dir: None,
            fallback_shell: None,
            fail_fast: false,
            max_parallel: 1,
            capture_bytes: DEFAULT_CAPTURE_BYTES,
        }
    }
}

impl RunOptions {
    /// Options matching loaded configuration settings.
    #[must_use]
    pub fn from_settings(settings: &Settings, verbose: bool) -> Self {
        Self {
            verbose,
            log_dir: settings.log_dir.clone(),
            fallback_shell: settings.fallback_shell.clone(),
            fail_fast: settings.fail_fast,
            max_parallel: settings.max_parallel,
            capture_bytes: settings.capture_bytes.unwrap_or(DEFAULT_CAPTURE_BYTES),
        }
    }
}

#[derive(Debug)]
enum CheckResult {
    Ran(ExecutionOutcome),
    Skipped(String),
}

impl CheckResult {
    fn failed(&self) -> bool {
        matches!(self, Self::Ran(outcome) if !outcome.passed())
    }
}

/// State shared by every check of one run.
struct RunContext {
    repo_root: PathBuf,
    log_dir: PathBuf,
    options: RunOptions,
    probe: Arc<dyn HostProbe>,
    progress: Arc<dyn ProgressSink>,
}

impl RunContext {
    /// Record a check that fail-fast kept from starting.
    fn not_run(&self, index: usize, spec: &CheckSpec, first_failure: &str) -> CheckResult {
        let reason = format!("not run (fail-fast after {first_failure})");
        self.progress.check_started(index, &spec.name);
        self.progress.check_finished(
            index,
            &spec.name,
            &CheckStatus::Skipped {
                reason: reason.clone(),
            },
        );
        CheckResult::Skipped(reason)
    }
}

/// Runs a list of checks against one repository.
pub struct Dispatcher {
    repo_root: PathBuf,
    options: RunOptions,
    probe: Arc<dyn HostProbe>,
}

impl Dispatcher {
    pub fn new(repo_root: impl Into<PathBuf>, options: RunOptions) -> Self {
        Self {
            repo_root: repo_root.into(),
            options,
            probe: Arc::new(SystemProbe),
        }
    }

    /// Replace the host probe used for skip evaluation.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn HostProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Directory that receives log files of failing checks.
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.options
            .log_dir
            .clone()
            .unwrap_or_else(|| default_log_dir(&self.repo_root))
    }

    /// Run every check and aggregate the outcomes.
    ///
    /// Check failures are part of the report. Only failing to create the log
    /// directory or a log file aborts the run.
    pub async fn run_all(
        &self,
        checks: &[CheckSpec],
        progress: Arc<dyn ProgressSink>,
    ) -> Result<RunReport, DispatchError> {
        let log_dir = self.log_dir();
        ensure_dir_all(&log_dir).map_err(|source| DispatchError::LogDirectory {
            path: log_dir.clone(),
            source,
        })?;

        let ctx = Arc::new(RunContext {
            repo_root: self.repo_root.clone(),
            log_dir,
            options: self.options.clone(),
            probe: Arc::clone(&self.probe),
            progress,
        });

        info!(
            checks = checks.len(),
            max_parallel = self.options.max_parallel,
            fail_fast = self.options.fail_fast,
            "starting checks"
        );

        let results = if self.options.max_parallel <= 1 {
            run_sequential(&ctx, checks).await?
        } else {
            run_parallel(ctx, checks).await?
        };

        let mut report = RunReport::default();
        for (spec, result) in checks.iter().zip(results) {
            match result {
                CheckResult::Ran(outcome) => report.record_outcome(&spec.name, outcome),
                CheckResult::Skipped(reason) => report.record_skip(&spec.name, reason),
            }
        }

        info!(
            passed = report.passed.len(),
            failed = report.failures.len(),
            skipped = report.skipped.len(),
            "checks finished"
        );
        Ok(report)
    }
}

async fn run_sequential(
    ctx: &RunContext,
    checks: &[CheckSpec],
) -> Result<Vec<CheckResult>, DispatchError> {
    let mut results = Vec::with_capacity(checks.len());
    let mut first_failure: Option<&str> = None;

    for (index, spec) in checks.iter().enumerate() {
        if let Some(first) = first_failure {
            results.push(ctx.not_run(index, spec, first));
            continue;
        }
        let result = run_check(ctx, index, spec).await?;
        if ctx.options.fail_fast && result.failed() {
            first_failure = Some(spec.name.as_str());
        }
        results.push(result);
    }
    Ok(results)
}

async fn run_parallel(
    ctx: Arc<RunContext>,
    checks: &[CheckSpec],
) -> Result<Vec<CheckResult>, DispatchError> {
    let semaphore = Arc::new(Semaphore::new(ctx.options.max_parallel));
    let first_failure: Arc<OnceLock<String>> = Arc::new(OnceLock::new());
    let mut join_set = JoinSet::new();
    let mut names = HashMap::new();
    let mut slots: Vec<Option<CheckResult>> = checks.iter().map(|_| None).collect();

    for (index, spec) in checks.iter().enumerate() {
        // Checks start in declaration order as permits free up.
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| DispatchError::Worker {
                check: spec.name.clone(),
                reason: e.to_string(),
            })?;

        if let Some(first) = first_failure.get() {
            drop(permit);
            slots[index] = Some(ctx.not_run(index, spec, first));
            continue;
        }

        let task_ctx = Arc::clone(&ctx);
        let task_spec = spec.clone();
        let task_failure = Arc::clone(&first_failure);
        let handle = join_set.spawn(async move {
            let _permit = permit;
            let result = run_check(&task_ctx, index, &task_spec).await;
            if task_ctx.options.fail_fast && matches!(&result, Ok(r) if r.failed()) {
                let _ = task_failure.set(task_spec.name.clone());
            }
            (index, result)
        });
        names.insert(handle.id(), spec.name.clone());
    }

    while let Some(joined) = join_set.join_next_with_id().await {
        let (_, (index, result)) = joined.map_err(|e| DispatchError::Worker {
            check: names.get(&e.id()).cloned().unwrap_or_default(),
            reason: e.to_string(),
        })?;
        slots[index] = Some(result?);
    }

    slots
        .into_iter()
        .zip(checks)
        .map(|(slot, spec)| {
            slot.ok_or_else(|| DispatchError::Worker {
                check: spec.name.clone(),
                reason: "no result was recorded".to_string(),
            })
        })
        .collect()
}

fn working_directory(repo_root: &Path, spec: &CheckSpec) -> PathBuf {
    match &spec.working_directory {
        Some(dir) => repo_root.join(dir),
        None => repo_root.to_path_buf(),
    }
}

async fn run_check(
    ctx: &RunContext,
    index: usize,
    spec: &CheckSpec,
) -> Result<CheckResult, DispatchError> {
    let span = check_span(index, &spec.name);
    async {
        ctx.progress.check_started(index, &spec.name);
        let cwd = working_directory(&ctx.repo_root, spec);

        if let Applicability::Skip(reason) = evaluate(spec, &cwd, ctx.probe.as_ref()) {
            debug!(%reason, "check skipped");
            ctx.progress.check_finished(
                index,
                &spec.name,
                &CheckStatus::Skipped {
                    reason: reason.clone(),
                },
            );
            return Ok(CheckResult::Skipped(reason));
        }

        let invocation = resolve(
            spec.shell.as_deref(),
            &spec.command,
            ctx.options.fallback_shell.as_deref(),
        );
        debug!(invocation = %invocation, cwd = %cwd.display(), "resolved check");
        let env = adapt_environment(
            &invocation.executable,
            merged_environment(&spec.environment),
        );

        let path = log_path(&ctx.log_dir, index, &spec.name);
        let mut log = CheckLog::open(path.clone())
            .await
            .map_err(|source| DispatchError::LogFile { path, source })?;

        let outcome = run_captured(
            &invocation,
            &cwd,
            &env,
            &mut log,
            ctx.options.capture_bytes,
            ctx.options.verbose,
        )
        .await
        .conclude(log)
        .await;

        log_check_finished(
            index,
            &spec.name,
            outcome.exit_code,
            outcome.duration.as_millis(),
        );
        let status = if outcome.passed() {
            CheckStatus::Passed
        } else {
            CheckStatus::Failed {
                exit_code: outcome.exit_code,
            }
        };
        ctx.progress.check_finished(index, &spec.name, &status);
        Ok(CheckResult::Ran(outcome))
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_directory_joins_relative() {
        let root = Path::new("/repo");
        let spec = CheckSpec::new("a", "true").with_working_directory("web");
        assert_eq!(working_directory(root, &spec), PathBuf::from("/repo/web"));
        assert_eq!(
            working_directory(root, &CheckSpec::new("a", "true")),
            PathBuf::from("/repo")
        );
    }

    #[test]
    fn test_options_from_settings() {
        let settings = Settings {
            fail_fast: true,
            max_parallel: 3,
            capture_bytes: Some(4096),
            ..Settings::default()
        };
        let options = RunOptions::from_settings(&settings, true);
        assert!(options.verbose);
        assert!(options.fail_fast);
        assert_eq!(options.max_parallel, 3);
        assert_eq!(options.capture_bytes, 4096);
        assert_eq!(
            RunOptions::from_settings(&Settings::default(), false).capture_bytes,
            DEFAULT_CAPTURE_BYTES
        );
    }

    #[test]
    fn test_explicit_log_dir_wins() {
        let options = RunOptions {
            log_dir: Some(PathBuf::from("/tmp/pg-logs")),
            ..RunOptions::default()
        };
        let dispatcher = Dispatcher::new("/repo", options);
        assert_eq!(dispatcher.log_dir(), PathBuf::from("/tmp/pg-logs"));
    }
}
