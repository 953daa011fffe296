//! Repository and git-directory path helpers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the dot folder used when no git directory can be found.
pub const FALLBACK_DIR: &str = ".pushgate";

/// Prefix of the single line inside a `.git` pointer file.
const GITDIR_PREFIX: &str = "gitdir:";

/// Walk upward from `start` to the first directory containing `.git`.
///
/// `.git` may be a directory (normal clone) or a file (worktree, submodule).
#[must_use]
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Resolve the real git directory for a repository root.
///
/// Follows a `gitdir: <path>` pointer file, resolving relative targets
/// against `repo_root`. Returns `None` when `.git` is missing or the pointer
/// is malformed.
#[must_use]
pub fn resolve_git_dir(repo_root: &Path) -> Option<PathBuf> {
    let dot_git = repo_root.join(".git");
    let meta = fs::metadata(&dot_git).ok()?;
    if meta.is_dir() {
        return Some(dot_git);
    }

    let content = fs::read_to_string(&dot_git).ok()?;
    let target = content
        .lines()
        .find_map(|line| line.trim().strip_prefix(GITDIR_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    let target = Path::new(target);
    let resolved = if target.is_absolute() {
        target.to_path_buf()
    } else {
        repo_root.join(target)
    };
    resolved.is_dir().then_some(resolved)
}

/// Default directory for check logs.
///
/// `<git dir>/pushgate/logs` when a git directory resolves, otherwise
/// `<repo root>/.pushgate/logs`.
#[must_use]
pub fn default_log_dir(repo_root: &Path) -> PathBuf {
    match resolve_git_dir(repo_root) {
        Some(git_dir) => git_dir.join("pushgate").join("logs"),
        None => repo_root.join(FALLBACK_DIR).join("logs"),
    }
}

/// mkdir -p; treat `AlreadyExists` as success (removes TOCTTOU races)
pub fn ensure_dir_all<P: AsRef<Path>>(p: P) -> io::Result<()> {
    match fs::create_dir_all(&p) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}
