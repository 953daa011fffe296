//! Foundation utilities shared by every pushgate crate.

pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod os;
pub mod paths;
pub mod text;
