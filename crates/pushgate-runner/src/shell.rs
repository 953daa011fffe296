//! Shell resolution: which executable runs a check's command text, and how.
//!
//! Order is fixed: explicit per-check shell, then a shell invocation already
//! written into the command, then the configured fallback shell, then the OS
//! default. Earlier sources always win.

use crate::direct::parse_direct_invocation;
use crate::invocation::ResolvedInvocation;
use crate::lookup::resolve_posix_shell;
use tracing::debug;

/// Shells with a known argument convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellKind {
    Bash,
    Sh,
    Pwsh,
    PowerShell,
    Cmd,
    /// Anything else; the command is appended verbatim after the prefix args.
    Other(String),
}

impl ShellKind {
    /// Classify an executable name or path by its file stem.
    ///
    /// Case-insensitive, `.exe` stripped, so `C:\Git\bin\BASH.EXE` is bash.
    #[must_use]
    pub fn from_executable(executable: &str) -> Self {
        match shell_stem(executable).as_str() {
            "bash" => Self::Bash,
            "sh" => Self::Sh,
            "pwsh" => Self::Pwsh,
            "powershell" => Self::PowerShell,
            "cmd" => Self::Cmd,
            _ => Self::Other(executable.to_string()),
        }
    }

    #[must_use]
    pub const fn is_posix(&self) -> bool {
        matches!(self, Self::Bash | Self::Sh)
    }

    #[must_use]
    pub const fn is_powershell(&self) -> bool {
        matches!(self, Self::Pwsh | Self::PowerShell)
    }

    /// Arguments that precede the command text.
    fn command_flags(&self) -> &'static [&'static str] {
        match self {
            Self::Bash => &["-lc"],
            Self::Sh => &["-c"],
            Self::Pwsh | Self::PowerShell => &["-NoProfile", "-NonInteractive", "-Command"],
            Self::Cmd => &["/C"],
            Self::Other(_) => &[],
        }
    }
}

/// Lowercased file name of `executable` without directories or `.exe`.
pub(crate) fn shell_stem(executable: &str) -> String {
    let name = executable
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(executable)
        .to_ascii_lowercase();
    match name.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

/// Split a shell spec into executable and prefix arguments.
///
/// `"C:\Program Files\PowerShell\7\pwsh.exe" -NoLogo` yields the quoted path
/// and `["-NoLogo"]`. An unterminated leading quote makes the whole trimmed
/// string the executable.
#[must_use]
pub fn split_shell_spec(spec: &str) -> (String, Vec<String>) {
    let spec = spec.trim();
    let mut chars = spec.chars();
    match chars.next() {
        Some(quote @ ('"' | '\'')) => {
            let body = chars.as_str();
            match body.find(quote) {
                Some(end) => {
                    let executable = body[..end].to_string();
                    let prefix = body[end + quote.len_utf8()..]
                        .split_whitespace()
                        .map(str::to_string)
                        .collect();
                    (executable, prefix)
                }
                None => (spec.to_string(), Vec::new()),
            }
        }
        _ => {
            let mut parts = spec.split_whitespace().map(str::to_string);
            let executable = parts.next().unwrap_or_default();
            (executable, parts.collect())
        }
    }
}

/// Build the invocation of `command` under the shell described by `shell_spec`.
#[must_use]
pub fn invocation_for_shell(shell_spec: &str, command: &str) -> ResolvedInvocation {
    let (executable, prefix) = split_shell_spec(shell_spec);
    let kind = ShellKind::from_executable(&executable);
    let executable = match &kind {
        ShellKind::Cmd => "cmd.exe".to_string(),
        ShellKind::Bash | ShellKind::Sh => resolve_posix_shell(&executable),
        _ => executable,
    };

    ResolvedInvocation::new(executable)
        .args(prefix)
        .args(kind.command_flags().iter().copied())
        .arg(command)
}

/// Invocation used when nothing else selected a shell.
#[must_use]
pub fn default_invocation(command: &str) -> ResolvedInvocation {
    if cfg!(windows) {
        ResolvedInvocation::new("cmd.exe").args(["/C", command])
    } else {
        ResolvedInvocation::new("sh").args(["-c", command])
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Decide the executable and argv for a check's command.
///
/// ```rust
/// use pushgate_runner::resolve;
///
/// let inv = resolve(Some("pwsh"), "Get-ChildItem", None);
/// assert_eq!(inv.executable, "pwsh");
/// assert_eq!(inv.args, ["-NoProfile", "-NonInteractive", "-Command", "Get-ChildItem"]);
/// ```
#[must_use]
pub fn resolve(
    preferred: Option<&str>,
    command: &str,
    fallback: Option<&str>,
) -> ResolvedInvocation {
    if let Some(shell) = non_empty(preferred) {
        debug!(shell, "using check shell");
        return invocation_for_shell(shell, command);
    }

    if let Some(direct) = parse_direct_invocation(command) {
        debug!(shell = %direct.shell_token, "command is a direct shell invocation");
        let executable = if direct.kind.is_posix() {
            resolve_posix_shell(&direct.shell_token)
        } else {
            direct.shell_token
        };
        return ResolvedInvocation::new(executable).args(direct.args);
    }

    if let Some(shell) = non_empty(fallback) {
        debug!(shell, "using fallback shell");
        return invocation_for_shell(shell, command);
    }

    default_invocation(command)
}
