//! Operating system tags used by per-check `os` filters.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// One of the three host families a check can be restricted to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OsTag {
    Windows,
    Macos,
    Linux,
}

impl OsTag {
    /// Tag for the host this binary was compiled for.
    ///
    /// Anything that is neither Windows nor macOS is treated as Linux.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Macos
        } else {
            Self::Linux
        }
    }

    /// Normalize a free-form tag by case-insensitive substring match.
    ///
    /// `"Windows-latest"` is windows, `"osx"`, `"macOS"` and `"darwin"` are
    /// macos, `"ubuntu-22.04"` is linux. Returns `None` for unrecognized tags.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.contains("windows") {
            Some(Self::Windows)
        } else if lower.contains("osx") || lower.contains("macos") || lower.contains("darwin") {
            Some(Self::Macos)
        } else if lower.contains("linux") || lower.contains("ubuntu") {
            Some(Self::Linux)
        } else {
            None
        }
    }

    /// Normalize a list of tags, dropping unknown ones and duplicates while
    /// keeping first-seen order.
    #[must_use]
    pub fn normalize_all<S: AsRef<str>>(raw: &[S]) -> Vec<Self> {
        let mut out = Vec::new();
        for tag in raw.iter().filter_map(|t| Self::normalize(t.as_ref())) {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
        out
    }
}
