//! Installation of the git `pre-push` hook.
//!
//! The hook is a small POSIX shell script that hands control to
//! `pushgate run`. It carries a signature line so pushgate can tell its own
//! hook apart from one written by hand or by another tool.

use pushgate_utils::error::HookError;
use pushgate_utils::paths::resolve_git_dir;
use std::path::{Path, PathBuf};

/// Marks a hook as managed by pushgate.
pub const HOOK_SIGNATURE: &str = "# installed by pushgate";

/// What [`install`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(PathBuf),
    /// An older pushgate hook was rewritten.
    Updated(PathBuf),
    /// A foreign hook was replaced because `force` was set.
    Replaced(PathBuf),
}

/// What [`uninstall`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    Removed(PathBuf),
    NotInstalled,
}

/// Location of the `pre-push` hook for the repository at `repo_root`.
pub fn hook_path(repo_root: &Path) -> Result<PathBuf, HookError> {
    let git_dir = resolve_git_dir(repo_root).ok_or_else(|| HookError::NoGitDir {
        root: repo_root.to_path_buf(),
    })?;
    Ok(git_dir.join("hooks").join("pre-push"))
}

/// Script body that runs `program` as the gate.
#[must_use]
pub fn hook_script(program: &str) -> String {
    let quoted = program.replace('\'', r"'\''");
    format!(
        "#!/bin/sh\n{HOOK_SIGNATURE}\n# git passes <remote> <url> and the refs on stdin; pushgate needs neither.\nexec '{quoted}' run\n"
    )
}

#[must_use]
pub fn is_pushgate_hook(content: &str) -> bool {
    content.lines().any(|line| line.trim() == HOOK_SIGNATURE)
}

/// Write the hook. An existing hook without the signature is only replaced
/// when `force` is set.
pub fn install(repo_root: &Path, program: &str, force: bool) -> Result<InstallOutcome, HookError> {
    let path = hook_path(repo_root)?;
    let existing = match std::fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(source) => return Err(HookError::Write { path, source }),
    };

    let outcome = match existing {
        None => InstallOutcome::Installed(path.clone()),
        Some(content) if is_pushgate_hook(&content) => InstallOutcome::Updated(path.clone()),
        Some(_) if force => InstallOutcome::Replaced(path.clone()),
        Some(_) => return Err(HookError::ForeignHook { path }),
    };

    write_hook(&path, &hook_script(program))?;
    tracing::info!(path = %path.display(), "pre-push hook written");
    Ok(outcome)
}

/// Remove the hook if pushgate installed it. A foreign hook is left alone
/// and reported as an error.
pub fn uninstall(repo_root: &Path) -> Result<UninstallOutcome, HookError> {
    let path = hook_path(repo_root)?;
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(UninstallOutcome::NotInstalled);
        }
        Err(source) => return Err(HookError::Write { path, source }),
    };

    if !is_pushgate_hook(&content) {
        return Err(HookError::ForeignHook { path });
    }
    std::fs::remove_file(&path).map_err(|source| HookError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(UninstallOutcome::Removed(path))
}

fn write_hook(path: &Path, script: &str) -> Result<(), HookError> {
    let write_err = |source| HookError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, script).map_err(write_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .map_err(write_err)?;
    }
    Ok(())
}
