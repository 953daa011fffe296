//! Spawn a resolved invocation and tee its output.
//!
//! stdout and stderr are read concurrently and written, as they arrive, into
//! the bounded tail buffer, the check's log file and (in verbose mode) our
//! own stderr. Failures to start, read or log never escape as errors: they
//! become an exit code of 1 with the message appended to the output.

use crate::env::EnvMap;
use crate::error::RunnerError;
use crate::invocation::ResolvedInvocation;
use crate::log_file::CheckLog;
use crate::ring_buffer::RingBuffer;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

const READ_CHUNK: usize = 8192;

/// Result of running one check process.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub exit_code: i32,
    /// Most recent output, stdout and stderr interleaved in arrival order
    pub output: RingBuffer,
    pub duration: Duration,
}

impl CaptureOutcome {
    /// Close `log` according to the exit code and produce the check's outcome.
    pub async fn conclude(self, log: CheckLog) -> ExecutionOutcome {
        let log_file = log.finish(self.exit_code == 0).await;
        ExecutionOutcome {
            exit_code: self.exit_code,
            tail_text: self.output.to_string(),
            log_file,
            duration: self.duration,
        }
    }
}

/// What one check run leaves behind. `log_file` is set iff `exit_code != 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub exit_code: i32,
    pub tail_text: String,
    pub log_file: Option<PathBuf>,
    pub duration: Duration,
}

impl ExecutionOutcome {
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.exit_code == 0
    }
}

/// Fan-out of output chunks.
struct Tee<'a> {
    buffer: RingBuffer,
    log: &'a mut CheckLog,
    verbose: bool,
    log_error: Option<RunnerError>,
}

impl Tee<'_> {
    async fn push(&mut self, data: &[u8]) {
        self.buffer.write(data);
        if self.log_error.is_none() {
            if let Err(err) = self.log.write(data).await {
                self.log_error = Some(RunnerError::LogWrite {
                    path: self.log.path().to_path_buf(),
                    reason: err.to_string(),
                });
            }
        }
        if self.verbose {
            let mut stderr = tokio::io::stderr();
            let _ = stderr.write_all(data).await;
            let _ = stderr.flush().await;
        }
    }

    /// Append a failure line to buffer and log, bypassing the verbose tee.
    async fn record(&mut self, err: &RunnerError) {
        let line = format!("\npushgate: {err}\n");
        self.buffer.write(line.as_bytes());
        if let Err(write_err) = self.log.write(line.as_bytes()).await {
            warn!(
                path = %self.log.path().display(),
                error = %write_err,
                "could not record failure in check log"
            );
        }
        if self.verbose {
            let _ = tokio::io::stderr().write_all(line.as_bytes()).await;
        }
    }
}

/// Run `invocation` in `cwd` with exactly `env`, capturing up to
/// `capture_bytes` of trailing output.
pub async fn run_captured(
    invocation: &ResolvedInvocation,
    cwd: &Path,
    env: &EnvMap,
    log: &mut CheckLog,
    capture_bytes: usize,
    verbose: bool,
) -> CaptureOutcome {
    let started = Instant::now();
    let mut tee = Tee {
        buffer: RingBuffer::new(capture_bytes),
        log,
        verbose,
        log_error: None,
    };

    let mut exit_code = match pump(invocation, cwd, env, &mut tee).await {
        Ok(code) => code,
        Err(err) => {
            debug!(error = %err, "check process failed");
            tee.record(&err).await;
            1
        }
    };

    if let Some(err) = tee.log_error.take() {
        warn!(error = %err, "check output could not be logged");
        tee.record(&err).await;
        exit_code = 1;
    }

    CaptureOutcome {
        exit_code,
        output: tee.buffer,
        duration: started.elapsed(),
    }
}

async fn pump(
    invocation: &ResolvedInvocation,
    cwd: &Path,
    env: &EnvMap,
    tee: &mut Tee<'_>,
) -> Result<i32, RunnerError> {
    let program = invocation.executable.clone();
    let mut command = invocation.to_tokio_command();
    command
        .current_dir(cwd)
        .env_clear()
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| RunnerError::Spawn {
        program: program.clone(),
        reason: e.to_string(),
    })?;

    let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(RunnerError::Spawn {
            program,
            reason: "output pipes were not created".to_string(),
        });
    };

    let mut stdout_buf = vec![0u8; READ_CHUNK];
    let mut stderr_buf = vec![0u8; READ_CHUNK];
    let mut stdout_open = true;
    let mut stderr_open = true;
    let mut pipe_error = None;

    while stdout_open || stderr_open {
        tokio::select! {
            read = stdout.read(&mut stdout_buf), if stdout_open => match read {
                Ok(0) => stdout_open = false,
                Ok(n) => tee.push(&stdout_buf[..n]).await,
                Err(err) => {
                    stdout_open = false;
                    pipe_error.get_or_insert(RunnerError::Pipe {
                        program: program.clone(),
                        stream: "stdout",
                        reason: err.to_string(),
                    });
                }
            },
            read = stderr.read(&mut stderr_buf), if stderr_open => match read {
                Ok(0) => stderr_open = false,
                Ok(n) => tee.push(&stderr_buf[..n]).await,
                Err(err) => {
                    stderr_open = false;
                    pipe_error.get_or_insert(RunnerError::Pipe {
                        program: program.clone(),
                        stream: "stderr",
                        reason: err.to_string(),
                    });
                }
            },
        }
    }

    let status = child.wait().await.map_err(|e| RunnerError::Wait {
        program: program.clone(),
        reason: e.to_string(),
    })?;

    if let Some(err) = pipe_error {
        return Err(err);
    }

    status.code().ok_or_else(|| RunnerError::Terminated {
        program,
        status: status.to_string(),
    })
}
