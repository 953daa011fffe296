//! Per-check progress notifications.

use serde::Serialize;

/// How a check ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed { exit_code: i32 },
    Skipped { reason: String },
}

/// Receives one `check_started` and one `check_finished` per check index.
///
/// With parallel dispatch the calls for different checks interleave, so
/// implementations must not assume they arrive in index order.
pub trait ProgressSink: Send + Sync {
    fn check_started(&self, index: usize, name: &str);
    fn check_finished(&self, index: usize, name: &str, status: &CheckStatus);
}

/// Sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn check_started(&self, _index: usize, _name: &str) {}
    fn check_finished(&self, _index: usize, _name: &str, _status: &CheckStatus) {}
}
