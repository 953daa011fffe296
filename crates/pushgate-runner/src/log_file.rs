//! Per-check log files.
//!
//! Every check gets `<YYYYMMDD_HHMMSS>_<NN>_<name>.log` holding its complete
//! output. The file is removed again when the check passes.

use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Replace everything except ASCII alphanumerics, `-`, `_` and `.` with `_`.
#[must_use]
pub fn sanitize_check_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "check".to_string()
    } else {
        sanitized
    }
}

/// File name for the check at `index` started at `started`.
#[must_use]
pub fn log_file_name(started: &DateTime<Local>, index: usize, name: &str) -> String {
    format!(
        "{}_{:02}_{}.log",
        started.format("%Y%m%d_%H%M%S"),
        index,
        sanitize_check_name(name)
    )
}

/// Where a check started now would log to.
#[must_use]
pub fn log_path(dir: &Path, index: usize, name: &str) -> PathBuf {
    dir.join(log_file_name(&Local::now(), index, name))
}

/// Open log file for one check execution.
#[derive(Debug)]
pub struct CheckLog {
    path: PathBuf,
    file: File,
}

impl CheckLog {
    /// Create (or truncate) the log file inside `dir`.
    ///
    /// The directory must already exist.
    pub async fn create(dir: &Path, index: usize, name: &str) -> io::Result<Self> {
        Self::open(log_path(dir, index, name)).await
    }

    /// Create (or truncate) the log file at an already chosen path.
    pub async fn open(path: PathBuf) -> io::Result<Self> {
        let file = File::create(&path).await?;
        Ok(Self { path, file })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data).await
    }

    /// Close the log. On success the file is deleted and `None` returned;
    /// otherwise the path of the kept file is returned.
    pub async fn finish(mut self, success: bool) -> Option<PathBuf> {
        if let Err(err) = self.file.flush().await {
            warn!(path = %self.path.display(), error = %err, "failed to flush check log");
        }
        drop(self.file);

        if !success {
            return Some(self.path);
        }
        if let Err(err) = tokio::fs::remove_file(&self.path).await {
            warn!(path = %self.path.display(), error = %err, "failed to remove log of passing check");
        }
        None
    }
}
