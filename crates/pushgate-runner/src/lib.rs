//! Process execution for pushgate checks.
//!
//! Turns a raw command line plus an optional shell preference into a concrete
//! argv ([`shell::resolve`]), rewrites PATH for the shell dialect that will run
//! it ([`env::adapt_environment`]), and runs it while teeing output into a
//! bounded [`RingBuffer`] and a per-check [`CheckLog`].
//!
//! All process execution goes through [`ResolvedInvocation`] so arguments
//! reach the child as discrete argv elements. The only shell parsing of the
//! user's command text happens inside the shell the user asked for.

pub mod capture;
pub mod direct;
pub mod env;
pub mod error;
pub mod invocation;
pub mod log_file;
pub mod lookup;
pub mod ring_buffer;
pub mod shell;

pub use capture::{CaptureOutcome, ExecutionOutcome, run_captured};
pub use env::{EnvMap, adapt_environment, merged_environment};
pub use error::RunnerError;
pub use invocation::ResolvedInvocation;
pub use log_file::CheckLog;
pub use lookup::ShellFlavor;
pub use ring_buffer::{DEFAULT_CAPTURE_BYTES, RingBuffer};
pub use shell::{ShellKind, resolve};
