//! Aggregate result of one dispatcher run.

use pushgate_runner::ExecutionOutcome;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Every check ends in exactly one of `passed`, `failures` or `skipped`.
/// The lists follow declaration order; the maps are keyed by check name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub passed: Vec<String>,
    pub failures: Vec<String>,
    pub skipped: Vec<String>,
    /// Captured trailing output of failed checks.
    pub tails: BTreeMap<String, String>,
    /// Kept log of failed checks.
    pub log_files: BTreeMap<String, PathBuf>,
    pub exit_codes: BTreeMap<String, i32>,
    pub skip_reasons: BTreeMap<String, String>,
    /// Wall time of checks that ran.
    pub durations_ms: BTreeMap<String, u64>,
}

impl RunReport {
    pub(crate) fn record_outcome(&mut self, name: &str, outcome: ExecutionOutcome) {
        let millis = u64::try_from(outcome.duration.as_millis()).unwrap_or(u64::MAX);
        self.durations_ms.insert(name.to_string(), millis);
        if outcome.passed() {
            self.passed.push(name.to_string());
            return;
        }
        self.failures.push(name.to_string());
        self.exit_codes.insert(name.to_string(), outcome.exit_code);
        self.tails.insert(name.to_string(), outcome.tail_text);
        if let Some(path) = outcome.log_file {
            self.log_files.insert(name.to_string(), path);
        }
    }

    pub(crate) fn record_skip(&mut self, name: &str, reason: String) {
        self.skipped.push(name.to_string());
        self.skip_reasons.insert(name.to_string(), reason);
    }

    /// True when no check failed. Skips do not count as failures.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.passed.len() + self.failures.len() + self.skipped.len()
    }
}
