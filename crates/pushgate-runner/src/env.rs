//! Environment construction and PATH dialect translation.
//!
//! On Windows a check may run under cmd/PowerShell (which want
//! `C:\a;D:\b`) or under Git Bash / WSL bash (which want `/c/a:/d/b` or
//! `/mnt/c/a:/mnt/d/b`). The PATH handed to the child is rewritten to the
//! dialect of the shell that will actually run. Elsewhere this is a no-op.

use crate::lookup::ShellFlavor;
use crate::shell::ShellKind;
use pushgate_utils::os::OsTag;
use std::collections::BTreeMap;
use tracing::debug;

/// Environment handed to a child process.
pub type EnvMap = BTreeMap<String, String>;

/// Process environment overlaid with a check's own variables.
///
/// Non-UTF-8 variables of the current process are dropped.
#[must_use]
pub fn merged_environment(overrides: &BTreeMap<String, String>) -> EnvMap {
    let base: EnvMap = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect();
    merge_environment(base, overrides, cfg!(windows))
}

/// Apply `overrides` on top of `base`.
///
/// With `case_insensitive` an override replaces any base key that differs
/// only in case, as Windows treats `Path` and `PATH` as the same variable.
#[must_use]
pub fn merge_environment(
    mut base: EnvMap,
    overrides: &BTreeMap<String, String>,
    case_insensitive: bool,
) -> EnvMap {
    for (key, value) in overrides {
        if case_insensitive {
            base.retain(|existing, _| !existing.eq_ignore_ascii_case(key));
        }
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Rewrite PATH for the shell that will run `executable` on this host.
#[must_use]
pub fn adapt_environment(executable: &str, env: EnvMap) -> EnvMap {
    adapt_environment_for(OsTag::current(), executable, env)
}

/// Host-parameterised core of [`adapt_environment`].
#[must_use]
pub fn adapt_environment_for(host: OsTag, executable: &str, mut env: EnvMap) -> EnvMap {
    if host != OsTag::Windows {
        return env;
    }
    let Some(key) = env.keys().find(|k| k.eq_ignore_ascii_case("PATH")).cloned() else {
        return env;
    };
    let Some(value) = env.get(&key) else {
        return env;
    };

    let rewritten = if ShellKind::from_executable(executable).is_posix() {
        if looks_like_posix_list(value) {
            None
        } else {
            Some(windows_list_to_posix(value, ShellFlavor::detect(executable)))
        }
    } else if looks_like_posix_list(value) && !value.contains(';') {
        posix_list_to_windows(value)
    } else {
        None
    };

    if let Some(new_value) = rewritten {
        debug!(variable = %key, executable, "rewrote PATH for shell dialect");
        env.insert(key, new_value);
    }
    env
}

/// Heuristic for "this PATH value is already colon-separated POSIX".
///
/// True when non-empty and it starts with `/` or has a colon anywhere other
/// than the drive position (`X:` at the start of a `;`-separated entry).
#[must_use]
pub fn looks_like_posix_list(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    if value.starts_with('/') {
        return true;
    }
    value.split(';').any(|entry| {
        let entry = strip_quotes(entry.trim());
        entry
            .match_indices(':')
            .any(|(i, _)| !(i == 1 && entry.as_bytes()[0].is_ascii_alphabetic()))
    })
}

fn strip_quotes(entry: &str) -> &str {
    let entry = entry.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = entry
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    entry
}

/// `C:\a\b` to `/c/a/b` (MSYS) or `/mnt/c/a/b` (WSL). `None` if not a
/// drive path.
#[must_use]
pub fn windows_path_to_posix(entry: &str, flavor: ShellFlavor) -> Option<String> {
    let bytes = entry.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_alphabetic() || bytes[1] != b':' {
        return None;
    }
    if bytes.len() > 2 && !matches!(bytes[2], b'\\' | b'/') {
        return None;
    }
    let drive = char::from(bytes[0]).to_ascii_lowercase();
    let rest = entry[2..].replace('\\', "/");
    let prefix = match flavor {
        ShellFlavor::Msys => format!("/{drive}"),
        ShellFlavor::Wsl => format!("/mnt/{drive}"),
    };
    Some(format!("{prefix}{rest}"))
}

/// `/c/a/b` or `/mnt/c/a/b` to `C:\a\b`. `None` for any other shape.
#[must_use]
pub fn posix_path_to_windows(segment: &str) -> Option<String> {
    let after_drive = |s: &str| -> Option<(char, String)> {
        let mut chars = s.chars();
        let drive = chars.next().filter(char::is_ascii_alphabetic)?;
        let rest = chars.as_str();
        if !(rest.is_empty() || rest.starts_with('/')) {
            return None;
        }
        Some((drive.to_ascii_uppercase(), rest.replace('/', "\\")))
    };

    let (drive, rest) = segment
        .strip_prefix("/mnt/")
        .and_then(after_drive)
        .or_else(|| segment.strip_prefix('/').and_then(after_drive))?;
    if rest.is_empty() {
        Some(format!("{drive}:\\"))
    } else {
        Some(format!("{drive}:{rest}"))
    }
}

/// Convert a `;`-separated Windows list to a `:`-separated POSIX list.
///
/// Quotes around entries are stripped and empty entries dropped. Entries
/// that are not drive paths pass through unchanged.
#[must_use]
pub fn windows_list_to_posix(value: &str, flavor: ShellFlavor) -> String {
    value
        .split(';')
        .map(strip_quotes)
        .filter(|entry| !entry.is_empty())
        .map(|entry| windows_path_to_posix(entry, flavor).unwrap_or_else(|| entry.to_string()))
        .collect::<Vec<_>>()
        .join(":")
}

/// Convert a `:`-separated POSIX list to a `;`-separated Windows list.
///
/// Returns `None` when no segment converts, so callers leave the value
/// alone.
#[must_use]
pub fn posix_list_to_windows(value: &str) -> Option<String> {
    let mut converted_any = false;
    let segments: Vec<String> = value
        .split(':')
        .map(strip_quotes)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match posix_path_to_windows(segment) {
            Some(windows) => {
                converted_any = true;
                windows
            }
            None => segment.to_string(),
        })
        .collect();
    converted_any.then(|| segments.join(";"))
}
