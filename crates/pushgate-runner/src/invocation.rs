use serde::Serialize;
use std::fmt;
use tokio::process::Command as TokioCommand;

/// Concrete executable and argv for one check.
///
/// Arguments are discrete elements. The command text written by the user
/// is passed as a single argument to the shell that interprets it, never
/// re-split here.
///
/// # Example
///
/// ```rust
/// use pushgate_runner::ResolvedInvocation;
///
/// let inv = ResolvedInvocation::new("sh").arg("-c").arg("cargo test");
///
/// assert_eq!(inv.executable, "sh");
/// assert_eq!(inv.args, vec!["-c", "cargo test"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedInvocation {
    /// Program name or path handed to the OS
    pub executable: String,
    /// Arguments in order
    pub args: Vec<String>,
}

impl ResolvedInvocation {
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build a `tokio::process::Command` for this invocation.
    ///
    /// Working directory, environment and stdio are left to the caller.
    #[must_use]
    pub fn to_tokio_command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.executable);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for ResolvedInvocation {
    /// Renders a readable command line for diagnostics. Not meant to be
    /// re-parsed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_argument_order() {
        let inv = ResolvedInvocation::new("pwsh")
            .args(["-NoProfile", "-NonInteractive"])
            .arg("-Command")
            .arg("Get-ChildItem");
        assert_eq!(
            inv.args,
            vec!["-NoProfile", "-NonInteractive", "-Command", "Get-ChildItem"]
        );
    }

    #[test]
    fn test_display_quotes_arguments_with_spaces() {
        let inv = ResolvedInvocation::new("bash").args(["-lc", "echo hi"]);
        assert_eq!(inv.to_string(), "bash -lc \"echo hi\"");
    }

    #[test]
    fn test_to_tokio_command_uses_executable() {
        let inv = ResolvedInvocation::new("sh").args(["-c", "true"]);
        let cmd = inv.to_tokio_command();
        assert_eq!(cmd.as_std().get_program(), "sh");
        assert_eq!(cmd.as_std().get_args().count(), 2);
    }
}
