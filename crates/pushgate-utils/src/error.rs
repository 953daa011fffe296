use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Library-level error type for pushgate.
///
/// Individual check failures are never represented here: a check that exits
/// non-zero, cannot be spawned, or cannot have its output written is recorded
/// in the run report as a failed check. `PushgateError` covers the cases that
/// prevent a coherent run from happening at all.
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration errors |
/// | 3 | Dispatcher-fatal I/O (log directory, log file) |
/// | 4 | Hook installation errors |
/// | 1 | Other errors |
///
/// Library code returns `PushgateError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum PushgateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    FileSystem,
    Hooks,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::FileSystem => write!(f, "File System"),
            Self::Hooks => write!(f, "Hooks"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {reason}")]
    InvalidFile { path: String, reason: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("No configuration file found under {root}")]
    Missing { root: String },

    #[error("Not inside a git repository: {start}")]
    NoRepository { start: String },

    #[error("Configuration validation failed: {error_count} errors")]
    ValidationFailed {
        errors: Vec<String>,
        error_count: usize,
    },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile { path, reason } => {
                format!("Configuration file {path} could not be parsed: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::Missing { root } => format!("No pushgate configuration in {root}"),
            Self::NoRepository { start } => {
                format!("{start} is not inside a git repository")
            }
            Self::ValidationFailed { errors, .. } => format!(
                "Configuration validation failed with {} errors: {}",
                errors.len(),
                errors.join(", ")
            ),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile { .. } => Some(
                "The file extension selects the parser: .yml/.yaml, .json or .toml.".to_string(),
            ),
            Self::Missing { .. } | Self::NotFound { .. } => Some(
                "pushgate looks for .pushgate.yml, .pushgate.yaml, .pushgate.json or .pushgate.toml at the repository root.".to_string(),
            ),
            Self::NoRepository { .. } => Some(
                "The repository root is the nearest ancestor directory containing .git.".to_string(),
            ),
            Self::InvalidValue { .. } | Self::ValidationFailed { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile { .. } => vec![
                "Check the file syntax with a YAML/JSON/TOML validator".to_string(),
            ],
            Self::Missing { .. } | Self::NotFound { .. } => vec![
                "Create .pushgate.yml with a `checks:` list".to_string(),
                "Pass --config <PATH> to use a file elsewhere".to_string(),
            ],
            Self::NoRepository { .. } => {
                vec!["Run pushgate from inside a git working tree".to_string()]
            }
            Self::InvalidValue { key, .. } => match key.as_str() {
                "max_parallel" | "jobs" => vec!["Use a positive integer".to_string()],
                "tail_lines" | "tail" => vec!["Use a positive number of lines".to_string()],
                _ => vec!["Check the documented configuration keys".to_string()],
            },
            Self::ValidationFailed { .. } => vec![
                "Every check needs a unique, non-empty `name` and a non-empty `command`"
                    .to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Errors that abort a whole run, as opposed to failing a single check.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Cannot create log directory {path}: {source}")]
    LogDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Check worker for '{check}' terminated unexpectedly: {reason}")]
    Worker { check: String, reason: String },
}

impl UserFriendlyError for DispatchError {
    fn user_message(&self) -> String {
        match self {
            Self::LogDirectory { path, source } => format!(
                "Could not create the log directory {}: {source}",
                path.display()
            ),
            Self::LogFile { path, source } => {
                format!("Could not open the log file {}: {source}", path.display())
            }
            Self::Worker { check, reason } => {
                format!("Running check '{check}' crashed: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::LogDirectory { .. } | Self::LogFile { .. } => Some(
                "Full output of every check is written to a log file before the check starts."
                    .to_string(),
            ),
            Self::Worker { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::LogDirectory { .. } | Self::LogFile { .. } => vec![
                "Check permissions on the repository's .git directory".to_string(),
                "Pass --log-dir <DIR> to write logs somewhere writable".to_string(),
            ],
            Self::Worker { .. } => vec!["Re-run with --jobs 1 and --verbose".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::FileSystem
    }
}

/// Git hook installation errors
#[derive(Error, Debug)]
pub enum HookError {
    #[error("A pre-push hook not managed by pushgate already exists at {path}")]
    ForeignHook { path: PathBuf },

    #[error("Cannot locate the git directory for {root}")]
    NoGitDir { root: PathBuf },

    #[error("Failed to write hook {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl UserFriendlyError for HookError {
    fn user_message(&self) -> String {
        match self {
            Self::ForeignHook { path } => format!(
                "Refusing to overwrite the existing hook at {}",
                path.display()
            ),
            Self::NoGitDir { root } => {
                format!("No .git directory or gitdir file under {}", root.display())
            }
            Self::Write { path, source } => {
                format!("Could not write {}: {source}", path.display())
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::ForeignHook { .. } => {
                Some("pushgate only replaces hooks it installed itself.".to_string())
            }
            Self::NoGitDir { .. } | Self::Write { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ForeignHook { .. } => vec![
                "Merge the existing hook by hand, or pass --force to replace it".to_string(),
            ],
            Self::NoGitDir { .. } => vec!["Run `git init` first".to_string()],
            Self::Write { .. } => vec!["Check permissions on .git/hooks".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Hooks
    }
}

impl UserFriendlyError for PushgateError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Dispatch(err) => err.user_message(),
            Self::Hook(err) => err.user_message(),
            Self::Io(err) => format!("File system operation failed: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Dispatch(err) => err.context(),
            Self::Hook(err) => err.context(),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Dispatch(err) => err.suggestions(),
            Self::Hook(err) => err.suggestions(),
            Self::Io(_) => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(err) => err.category(),
            Self::Dispatch(err) => err.category(),
            Self::Hook(err) => err.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl PushgateError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// ```text
    /// Error: <user message>
    ///
    /// Context: <context if available>
    ///
    /// Suggestions:
    ///   • <suggestion 1>
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CONFIG,
            Self::Dispatch(_) => ExitCode::DISPATCH,
            Self::Hook(_) => ExitCode::HOOK,
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}
