use pushgate_utils::error::ConfigError;
use pushgate_utils::paths::find_repo_root;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::model::{CliOverrides, Config, ConfigSource, FileConfig, Settings};

/// File names looked for at the repository root, in order.
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    ".pushgate.yml",
    ".pushgate.yaml",
    ".pushgate.json",
    ".pushgate.toml",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults.
    pub fn discover(overrides: &CliOverrides) -> Result<Self, ConfigError> {
        let start_dir = std::env::current_dir().map_err(|e| ConfigError::InvalidValue {
            key: "current_dir".to_string(),
            value: e.to_string(),
        })?;
        Self::discover_from(&start_dir, overrides)
    }

    /// Discover and load configuration starting from a specific directory.
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    /// A relative `--config` path is resolved against `start_dir`.
    pub fn discover_from(start_dir: &Path, overrides: &CliOverrides) -> Result<Self, ConfigError> {
        let repo_root = find_repo_root(start_dir).ok_or_else(|| ConfigError::NoRepository {
            start: start_dir.display().to_string(),
        })?;

        let source_path = match &overrides.config_path {
            Some(explicit) => {
                let path = if explicit.is_absolute() {
                    explicit.clone()
                } else {
                    start_dir.join(explicit)
                };
                if !path.is_file() {
                    return Err(ConfigError::NotFound {
                        path: path.display().to_string(),
                    });
                }
                path
            }
            None => discover_config_file(&repo_root).ok_or_else(|| ConfigError::Missing {
                root: repo_root.display().to_string(),
            })?,
        };

        tracing::debug!(path = %source_path.display(), "loading configuration");
        let file = load_config_file(&source_path)?;
        Self::assemble(repo_root, source_path, file, overrides)
    }

    /// Build a configuration from document text, as if read from `source_path`.
    pub fn from_str_at(
        repo_root: &Path,
        source_path: &Path,
        text: &str,
        overrides: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let file = parse_config(source_path, text)?;
        Self::assemble(
            repo_root.to_path_buf(),
            source_path.to_path_buf(),
            file,
            overrides,
        )
    }

    fn assemble(
        repo_root: PathBuf,
        source_path: PathBuf,
        file: FileConfig,
        overrides: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let mut source_attribution = HashMap::new();
        let defaults = Settings::default();

        let fail_fast = layer(
            "fail_fast",
            overrides.fail_fast,
            file.fail_fast,
            defaults.fail_fast,
            &mut source_attribution,
        );
        let max_parallel = layer(
            "max_parallel",
            overrides.max_parallel,
            file.max_parallel,
            defaults.max_parallel,
            &mut source_attribution,
        );
        let tail_lines = layer(
            "tail_lines",
            overrides.tail_lines,
            file.tail_lines,
            defaults.tail_lines,
            &mut source_attribution,
        );
        let log_dir = layer(
            "log_dir",
            overrides.log_dir.clone().map(Some),
            file.log_dir.map(Some),
            defaults.log_dir,
            &mut source_attribution,
        );
        let fallback_shell = layer(
            "shell",
            None,
            file.shell.map(Some),
            defaults.fallback_shell,
            &mut source_attribution,
        );
        let capture_bytes = layer(
            "capture_bytes",
            None,
            file.capture_bytes.map(Some),
            defaults.capture_bytes,
            &mut source_attribution,
        );

        let mut config = Config {
            settings: Settings {
                fallback_shell: fallback_shell.filter(|s| !s.trim().is_empty()),
                fail_fast,
                max_parallel,
                log_dir: log_dir.map(|dir| {
                    if dir.is_absolute() {
                        dir
                    } else {
                        repo_root.join(dir)
                    }
                }),
                tail_lines,
                capture_bytes,
            },
            checks: file.checks.into_iter().map(Into::into).collect(),
            repo_root,
            source_path,
            source_attribution,
        };

        config.validate()?;
        Ok(config)
    }
}

fn layer<T>(
    key: &str,
    cli: Option<T>,
    file: Option<T>,
    default: T,
    attribution: &mut HashMap<String, ConfigSource>,
) -> T {
    let (value, source) = match (cli, file) {
        (Some(v), _) => (v, ConfigSource::Cli),
        (None, Some(v)) => (v, ConfigSource::Config),
        (None, None) => (default, ConfigSource::Default),
    };
    attribution.insert(key.to_string(), source);
    value
}

/// First configuration file present at `repo_root`.
#[must_use]
pub fn discover_config_file(repo_root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| repo_root.join(name))
        .find(|path| path.is_file())
}

fn load_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_config(path, &text)
}

fn parse_config(path: &Path, text: &str) -> Result<FileConfig, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidFile {
        path: path.display().to_string(),
        reason,
    };

    if text.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    match Format::from_path(path) {
        Format::Yaml => serde_yaml::from_str(text).map_err(|e| invalid(e.to_string())),
        Format::Json => serde_json::from_str(text).map_err(|e| invalid(e.to_string())),
        Format::Toml => toml::from_str(text).map_err(|e| invalid(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a/.pushgate.yml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("x.JSON")), Format::Json);
        assert_eq!(Format::from_path(Path::new("x.toml")), Format::Toml);
        assert_eq!(Format::from_path(Path::new("noext")), Format::Yaml);
    }

    #[test]
    fn test_discovery_order_prefers_yml() {
        let dir = repo();
        std::fs::write(dir.path().join(".pushgate.toml"), "").unwrap();
        std::fs::write(dir.path().join(".pushgate.yml"), "").unwrap();
        let found = discover_config_file(dir.path()).unwrap();
        assert!(found.ends_with(".pushgate.yml"));
    }

    #[test]
    fn test_missing_config_reports_root() {
        let dir = repo();
        let err = Config::discover_from(dir.path(), &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn test_outside_repository() {
        let dir = TempDir::new().unwrap();
        let err = Config::discover_from(dir.path(), &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoRepository { .. }));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = repo();
        let overrides = CliOverrides {
            config_path: Some(PathBuf::from("nope.yml")),
            ..CliOverrides::default()
        };
        let err = Config::discover_from(dir.path(), &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let dir = repo();
        std::fs::write(
            dir.path().join(".pushgate.yml"),
            "fail_fast: false\nmax_parallel: 2\ntail_lines: 5\nchecks:\n  - name: a\n    run: echo a\n",
        )
        .unwrap();
        let overrides = CliOverrides {
            fail_fast: Some(true),
            ..CliOverrides::default()
        };
        let config = Config::discover_from(dir.path(), &overrides).unwrap();
        assert!(config.settings.fail_fast);
        assert_eq!(config.settings.max_parallel, 2);
        assert_eq!(config.settings.tail_lines, 5);
        assert_eq!(config.source_attribution["fail_fast"], ConfigSource::Cli);
        assert_eq!(config.source_attribution["max_parallel"], ConfigSource::Config);
        assert_eq!(config.source_attribution["log_dir"], ConfigSource::Default);
    }

    #[test]
    fn test_relative_log_dir_is_anchored_at_root() {
        let dir = repo();
        std::fs::write(
            dir.path().join(".pushgate.json"),
            r#"{"log_dir": "build/logs", "checks": [{"name": "a", "command": "true"}]}"#,
        )
        .unwrap();
        let config = Config::discover_from(dir.path(), &CliOverrides::default()).unwrap();
        assert_eq!(
            config.settings.log_dir,
            Some(dir.path().join("build").join("logs"))
        );
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = repo();
        std::fs::write(dir.path().join(".pushgate.toml"), "checks = [").unwrap();
        let err = Config::discover_from(dir.path(), &CliOverrides::default()).unwrap_err();
        match err {
            ConfigError::InvalidFile { path, .. } => assert!(path.ends_with(".pushgate.toml")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
