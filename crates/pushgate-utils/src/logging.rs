//! Tracing setup for pushgate.
//!
//! Diagnostics go to stderr so that stdout stays free for the run report
//! (and for `--json` output).

use std::io::IsTerminal;
use tracing::{Level, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "PUSHGATE_LOG";

/// Check if colored diagnostics should be used.
///
/// Returns true only if stderr is a terminal and `NO_COLOR` is not set.
#[must_use]
pub fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Filter used when neither `PUSHGATE_LOG` nor `RUST_LOG` is set.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "pushgate=debug,info"
    } else {
        "pushgate=warn,warn"
    }
}

/// Build the filter: `PUSHGATE_LOG`, then `RUST_LOG`, then a verbosity default.
fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Initialize the tracing subscriber.
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = build_filter(verbose);

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(use_color())
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(use_color())
                    .with_target(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span wrapping one check execution.
pub fn check_span(index: usize, name: &str) -> tracing::Span {
    span!(Level::INFO, "check", index = index, check = %name)
}

/// Log a finished check with its exit code and duration.
pub fn log_check_finished(index: usize, name: &str, exit_code: i32, duration_ms: u128) {
    if exit_code == 0 {
        info!(index, check = %name, exit_code, duration_ms = %duration_ms, "check passed");
    } else {
        info!(index, check = %name, exit_code, duration_ms = %duration_ms, "check failed");
    }
}
