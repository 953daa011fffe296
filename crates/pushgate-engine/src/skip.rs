//! Applicability of a check on this machine.
//!
//! A check is skipped, never failed, when it is restricted to other operating
//! systems or when a tool it needs cannot be found.

use pushgate_config::CheckSpec;
use pushgate_runner::ShellKind;
use pushgate_runner::shell::split_shell_spec;
use pushgate_utils::os::OsTag;
use std::path::Path;

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    Run,
    Skip(String),
}

impl Applicability {
    #[must_use]
    pub const fn should_run(&self) -> bool {
        matches!(self, Self::Run)
    }
}

/// Facts about the host the evaluator depends on.
pub trait HostProbe: Send + Sync {
    fn current_os(&self) -> OsTag;

    /// Whether `token` names an existing file (when it contains a path
    /// separator, relative to `cwd`) or an executable on PATH.
    fn tool_available(&self, token: &str, cwd: &Path) -> bool;
}

/// Probe backed by the real filesystem and PATH.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl HostProbe for SystemProbe {
    fn current_os(&self) -> OsTag {
        OsTag::current()
    }

    fn tool_available(&self, token: &str, cwd: &Path) -> bool {
        if has_path_separator(token) {
            cwd.join(token).exists()
        } else {
            which::which(token).is_ok()
        }
    }
}

fn has_path_separator(token: &str) -> bool {
    token.contains('/') || token.contains('\\')
}

/// Decide whether `spec` runs here. `cwd` is the check's working directory.
pub fn evaluate(spec: &CheckSpec, cwd: &Path, probe: &dyn HostProbe) -> Applicability {
    let allowed = OsTag::normalize_all(&spec.allowed_os);
    if !allowed.is_empty() && !allowed.contains(&probe.current_os()) {
        let want: Vec<&str> = allowed.iter().map(AsRef::as_ref).collect();
        return Applicability::Skip(format!("os mismatch (want {})", want.join(",")));
    }

    let missing: Vec<String> = tool_tokens(spec)
        .into_iter()
        .filter(|token| !probe.tool_available(token, cwd))
        .collect();
    if missing.is_empty() {
        Applicability::Run
    } else {
        Applicability::Skip(format!("missing tools: {}", missing.join(", ")))
    }
}

/// First word of every required tool plus the explicit shell, de-duplicated
/// in declaration order.
fn tool_tokens(spec: &CheckSpec) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut add = |token: String| {
        if !token.is_empty() && !tokens.contains(&token) {
            tokens.push(token);
        }
    };

    for tool in &spec.required_tools {
        if let Some(first) = tool.split_whitespace().next() {
            add(first.to_string());
        }
    }

    if let Some(shell) = spec.shell.as_deref() {
        let (executable, _) = split_shell_spec(shell);
        if ShellKind::from_executable(&executable) != ShellKind::Cmd {
            add(executable);
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FakeProbe {
        os: OsTag,
        tools: HashSet<&'static str>,
    }

    impl FakeProbe {
        fn new(os: OsTag, tools: &[&'static str]) -> Self {
            Self {
                os,
                tools: tools.iter().copied().collect(),
            }
        }
    }

    impl HostProbe for FakeProbe {
        fn current_os(&self) -> OsTag {
            self.os
        }

        fn tool_available(&self, token: &str, _cwd: &Path) -> bool {
            self.tools.contains(token)
        }
    }

    fn eval(spec: &CheckSpec, probe: &FakeProbe) -> Applicability {
        evaluate(spec, Path::new("/repo"), probe)
    }

    #[test]
    fn test_no_restrictions_runs() {
        let probe = FakeProbe::new(OsTag::Linux, &[]);
        assert_eq!(eval(&CheckSpec::new("a", "true"), &probe), Applicability::Run);
    }

    #[test]
    fn test_os_mismatch_lists_normalised_tags() {
        let probe = FakeProbe::new(OsTag::Linux, &[]);
        let spec =
            CheckSpec::new("a", "true").with_allowed_os(["Darwin", "windows-latest", "OSX"]);
        assert_eq!(
            eval(&spec, &probe),
            Applicability::Skip("os mismatch (want macos,windows)".to_string())
        );
    }

    #[test]
    fn test_matching_os_runs() {
        let probe = FakeProbe::new(OsTag::Linux, &[]);
        let spec = CheckSpec::new("a", "true").with_allowed_os(["ubuntu-22.04", "macos"]);
        assert!(eval(&spec, &probe).should_run());
    }

    #[test]
    fn test_unrecognised_tags_mean_all_oses() {
        let probe = FakeProbe::new(OsTag::Windows, &[]);
        let spec = CheckSpec::new("a", "true").with_allowed_os(["freebsd", "plan9"]);
        assert!(eval(&spec, &probe).should_run());
    }

    #[test]
    fn test_missing_tools_use_first_token_and_dedupe() {
        let probe = FakeProbe::new(OsTag::Linux, &["cargo"]);
        let spec = CheckSpec::new("a", "true").with_required_tools([
            "cargo",
            "node --version",
            "node",
            "  ",
            "./scripts/lint.sh --fix",
        ]);
        assert_eq!(
            eval(&spec, &probe),
            Applicability::Skip("missing tools: node, ./scripts/lint.sh".to_string())
        );
    }

    #[test]
    fn test_explicit_shell_is_implicit_tool() {
        let probe = FakeProbe::new(OsTag::Linux, &[]);
        let spec = CheckSpec::new("a", "Get-Date").with_shell("pwsh -NoLogo");
        assert_eq!(
            eval(&spec, &probe),
            Applicability::Skip("missing tools: pwsh".to_string())
        );

        let spec = CheckSpec::new("a", "dir").with_shell("cmd");
        assert!(eval(&spec, &probe).should_run());
    }

    #[test]
    fn test_shell_already_required_is_checked_once() {
        let probe = FakeProbe::new(OsTag::Linux, &[]);
        let spec = CheckSpec::new("a", "x")
            .with_shell("bash")
            .with_required_tools(["bash"]);
        assert_eq!(
            eval(&spec, &probe),
            Applicability::Skip("missing tools: bash".to_string())
        );
    }

    #[test]
    fn test_system_probe_checks_paths_relative_to_cwd() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("bin").join("tool"), "").unwrap();
        assert!(SystemProbe.tool_available("bin/tool", dir.path()));
        assert!(!SystemProbe.tool_available("bin/other", dir.path()));
        assert!(!SystemProbe.tool_available("pushgate-no-such-tool-xyz", dir.path()));
    }
}
