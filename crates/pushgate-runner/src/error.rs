//! Error types for check execution

use std::path::PathBuf;
use thiserror::Error;

/// Failures while running a single check.
///
/// None of these abort a run: the capture layer turns each one into an
/// exit-code-1 outcome with the message recorded in the output.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("failed to read {stream} of {program}: {reason}")]
    Pipe {
        program: String,
        stream: &'static str,
        reason: String,
    },

    #[error("failed to wait for {program}: {reason}")]
    Wait { program: String, reason: String },

    #[error("{program} terminated without an exit code ({status})")]
    Terminated { program: String, status: String },

    #[error("failed to write log {path}: {reason}")]
    LogWrite { path: PathBuf, reason: String },
}
