//! Locating bash/sh on Windows and telling Git Bash from WSL.
//!
//! `bash.exe` on a Windows PATH is often the WSL launcher in `System32` or a
//! `WindowsApps` stub. It runs inside the Linux VM and sees the working tree
//! under `/mnt/<drive>`, so Git for Windows' bash is preferred when both exist.

use std::path::{Path, PathBuf};
use tracing::debug;

/// POSIX path convention a Windows-hosted bash expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlavor {
    /// Git Bash / MSYS2 / Cygwin: `C:\x` is `/c/x`
    Msys,
    /// WSL: `C:\x` is `/mnt/c/x`
    Wsl,
}

impl ShellFlavor {
    /// Flavor implied by a shell executable path.
    #[must_use]
    pub fn detect(executable: &str) -> Self {
        if is_wsl_shell_path(executable) {
            Self::Wsl
        } else {
            Self::Msys
        }
    }
}

/// True for the WSL launchers: `system32\bash.exe`, `bash`/`wsl` stubs under
/// `WindowsApps`, and `wsl.exe` anywhere.
#[must_use]
pub fn is_wsl_shell_path(executable: &str) -> bool {
    let lower = executable.to_ascii_lowercase().replace('/', "\\");
    let file = lower.rsplit('\\').next().unwrap_or(&lower);
    let stem = file.strip_suffix(".exe").unwrap_or(file);

    if stem == "wsl" {
        return true;
    }
    if stem != "bash" {
        return false;
    }
    ["\\system32\\", "\\sysnative\\", "\\windowsapps\\"]
        .iter()
        .any(|dir| lower.contains(dir))
}

/// Git for Windows locations for `name` (`bash` or `sh`), in search order.
///
/// `env` reads an environment variable; it is a parameter so tests can
/// supply fake install roots.
#[must_use]
pub fn git_for_windows_candidates(
    name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();
    for var in ["ProgramFiles", "ProgramW6432", "ProgramFiles(x86)"] {
        let Some(base) = env(var).filter(|b| !b.trim().is_empty()) else {
            continue;
        };
        let base = base.trim_end_matches(['\\', '/']);
        for sub in ["Git\\usr\\bin", "Git\\bin"] {
            let candidate = PathBuf::from(format!("{base}\\{sub}\\{name}.exe"));
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }
    }
    out
}

/// Pick the bash/sh to run.
///
/// A non-WSL PATH hit wins outright. Otherwise the first existing Git for
/// Windows candidate is used, and a WSL hit is the last resort.
#[must_use]
pub fn pick_posix_shell(
    on_path: Option<PathBuf>,
    candidates: &[PathBuf],
    exists: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    if on_path
        .as_ref()
        .is_some_and(|found| !is_wsl_shell_path(&found.to_string_lossy()))
    {
        return on_path;
    }

    candidates
        .iter()
        .find(|c| exists(c))
        .cloned()
        .or(on_path)
}

/// Executable to use for a bash/sh shell token.
///
/// Outside Windows, or when the token already contains a directory, the
/// token is returned unchanged.
#[must_use]
pub fn resolve_posix_shell(token: &str) -> String {
    if !cfg!(windows) || token.contains(['/', '\\']) {
        return token.to_string();
    }
    let name = crate::shell::shell_stem(token);
    let on_path = which::which(token).ok();
    let candidates = git_for_windows_candidates(&name, |var| std::env::var(var).ok());
    match pick_posix_shell(on_path, &candidates, Path::exists) {
        Some(path) => {
            let path = simplify(path);
            debug!(token, resolved = %path.display(), "resolved posix shell");
            path.to_string_lossy().into_owned()
        }
        None => token.to_string(),
    }
}

#[cfg(windows)]
fn simplify(path: PathBuf) -> PathBuf {
    dunce::simplified(&path).to_path_buf()
}

#[cfg(not(windows))]
fn simplify(path: PathBuf) -> PathBuf {
    path
}
