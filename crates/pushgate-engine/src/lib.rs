//! Check execution engine for pushgate.
//!
//! [`Dispatcher::run_all`] takes the configured checks, decides which apply
//! to this machine ([`skip::evaluate`]), runs the rest through
//! `pushgate-runner` and folds the outcomes into a [`RunReport`].

pub mod dispatch;
pub mod progress;
pub mod report;
pub mod skip;

pub use dispatch::{Dispatcher, RunOptions};
pub use progress::{CheckStatus, NoProgress, ProgressSink};
pub use report::RunReport;
pub use skip::{Applicability, HostProbe, SystemProbe, evaluate};
