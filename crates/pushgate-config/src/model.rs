//! Configuration model.
//!
//! The `File*` types mirror the on-disk document and are only used while
//! loading. [`Config`] and [`CheckSpec`] are what the rest of pushgate sees.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

/// Lines of failing output shown per check when nothing else is configured.
pub const DEFAULT_TAIL_LINES: usize = 20;

/// Checks run one at a time unless configured otherwise.
pub const DEFAULT_MAX_PARALLEL: usize = 1;

/// One configured check. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSpec {
    pub name: String,
    pub command: String,
    /// Relative to the repository root when not absolute.
    pub working_directory: Option<PathBuf>,
    /// Applied over the inherited process environment.
    pub environment: BTreeMap<String, String>,
    pub shell: Option<String>,
    /// Raw OS tags as written; normalised when the check is evaluated.
    pub allowed_os: Vec<String>,
    pub required_tools: Vec<String>,
}

impl CheckSpec {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            working_directory: None,
            environment: BTreeMap::new(),
            shell: None,
            allowed_os: Vec::new(),
            required_tools: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    #[must_use]
    pub fn with_allowed_os<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.allowed_os = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_required_tools<S: Into<String>>(
        mut self,
        tools: impl IntoIterator<Item = S>,
    ) -> Self {
        self.required_tools = tools.into_iter().map(Into::into).collect();
        self
    }
}

/// Run-wide settings after CLI overrides and defaults have been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Shell used when neither the check nor its command names one.
    pub fallback_shell: Option<String>,
    pub fail_fast: bool,
    pub max_parallel: usize,
    pub log_dir: Option<PathBuf>,
    pub tail_lines: usize,
    /// `None` keeps the runner's own ceiling.
    pub capture_bytes: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fallback_shell: None,
            fail_fast: false,
            max_parallel: DEFAULT_MAX_PARALLEL,
            log_dir: None,
            tail_lines: DEFAULT_TAIL_LINES,
            capture_bytes: None,
        }
    }
}

/// Where a setting's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Command-line flag (highest precedence).
    Cli,
    /// Configuration file.
    Config,
    /// Built-in default (lowest precedence).
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::Config => write!(f, "config"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Values supplied on the command line. `None` leaves the file or default
/// value in place.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub fail_fast: Option<bool>,
    pub max_parallel: Option<usize>,
    pub log_dir: Option<PathBuf>,
    pub tail_lines: Option<usize>,
}

/// A loaded, validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub repo_root: PathBuf,
    /// The file the checks were read from.
    pub source_path: PathBuf,
    pub settings: Settings,
    pub checks: Vec<CheckSpec>,
    /// Source of each setting, keyed by its file key.
    pub source_attribution: HashMap<String, ConfigSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub shell: Option<String>,
    pub fail_fast: Option<bool>,
    pub max_parallel: Option<usize>,
    pub log_dir: Option<PathBuf>,
    pub tail_lines: Option<usize>,
    pub capture_bytes: Option<usize>,
    #[serde(default)]
    pub checks: Vec<FileCheck>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileCheck {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "run")]
    pub command: String,
    #[serde(default, alias = "working_directory")]
    pub cwd: Option<PathBuf>,
    #[serde(default, alias = "environment")]
    pub env: BTreeMap<String, Scalar>,
    pub shell: Option<String>,
    #[serde(default)]
    pub os: OneOrMany,
    #[serde(default)]
    pub requires: OneOrMany,
}

/// `os: linux` and `os: [linux, macos]` are both accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Environment values may be written unquoted in YAML and TOML.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<FileCheck> for CheckSpec {
    fn from(raw: FileCheck) -> Self {
        Self {
            name: raw.name.trim().to_string(),
            command: raw.command,
            working_directory: raw.cwd,
            environment: raw
                .env
                .into_iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect(),
            shell: raw.shell.filter(|s| !s.trim().is_empty()),
            allowed_os: raw.os.into_vec(),
            required_tools: raw.requires.into_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let spec = CheckSpec::new("lint", "cargo clippy")
            .with_working_directory("crates/app")
            .with_env("RUSTFLAGS", "-Dwarnings")
            .with_shell("bash")
            .with_allowed_os(["linux", "macos"])
            .with_required_tools(["cargo"]);
        assert_eq!(spec.working_directory, Some(PathBuf::from("crates/app")));
        assert_eq!(spec.environment["RUSTFLAGS"], "-Dwarnings");
        assert_eq!(spec.shell.as_deref(), Some("bash"));
        assert_eq!(spec.allowed_os, vec!["linux", "macos"]);
        assert_eq!(spec.required_tools, vec!["cargo"]);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Bool(true).to_string(), "true");
        assert_eq!(Scalar::Int(3).to_string(), "3");
        assert_eq!(Scalar::Text("x y".into()).to_string(), "x y");
    }

    #[test]
    fn test_one_or_many_into_vec() {
        assert_eq!(OneOrMany::One("linux".into()).into_vec(), vec!["linux"]);
        assert!(OneOrMany::default().into_vec().is_empty());
    }

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.max_parallel, 1);
        assert_eq!(s.tail_lines, DEFAULT_TAIL_LINES);
        assert!(!s.fail_fast);
        assert!(s.capture_bytes.is_none());
    }
}
