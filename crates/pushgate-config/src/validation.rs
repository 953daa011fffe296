use pushgate_utils::error::ConfigError;
use std::collections::HashSet;

use super::model::{CheckSpec, Config};

impl Config {
    /// Validate configuration values.
    ///
    /// Setting errors are reported one at a time; problems with individual
    /// checks are collected so a broken file is fixed in one pass.
    pub(crate) fn validate(&mut self) -> Result<(), ConfigError> {
        if self.settings.max_parallel == 0 {
            tracing::debug!("max_parallel of 0 treated as 1");
            self.settings.max_parallel = 1;
        }

        if self.settings.tail_lines == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tail_lines".to_string(),
                value: "must be greater than 0".to_string(),
            });
        }

        if self.settings.capture_bytes == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "capture_bytes".to_string(),
                value: "must be greater than 0".to_string(),
            });
        }

        let errors = check_errors(&self.checks);
        if !errors.is_empty() {
            return Err(ConfigError::ValidationFailed {
                error_count: errors.len(),
                errors,
            });
        }
        Ok(())
    }

    /// Checks named in `names`, in declaration order. Unknown names are an error.
    pub fn select(&self, names: &[String]) -> Result<Vec<CheckSpec>, ConfigError> {
        if names.is_empty() {
            return Ok(self.checks.clone());
        }
        let unknown: Vec<&str> = names
            .iter()
            .filter(|n| !self.checks.iter().any(|c| &c.name == *n))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "only".to_string(),
                value: format!("unknown check(s): {}", unknown.join(", ")),
            });
        }
        Ok(self
            .checks
            .iter()
            .filter(|c| names.contains(&c.name))
            .cloned()
            .collect())
    }
}

fn check_errors(checks: &[CheckSpec]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, check) in checks.iter().enumerate() {
        let label = if check.name.is_empty() {
            format!("checks[{i}]")
        } else {
            format!("checks[{i}] ({})", check.name)
        };

        if check.name.is_empty() {
            errors.push(format!("{label}: name must not be empty"));
        } else if !seen.insert(check.name.as_str()) {
            errors.push(format!("{label}: duplicate name '{}'", check.name));
        }

        if check.command.trim().is_empty() {
            errors.push(format!("{label}: command must not be empty"));
        }

        if check.environment.keys().any(|k| k.is_empty() || k.contains('=')) {
            errors.push(format!("{label}: environment names must be non-empty and contain no '='"));
        }
    }
    errors
}
