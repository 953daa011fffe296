//! Exit code constants for pushgate.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Every check passed or was skipped |
//! | 1 | `CHECKS_FAILED` | At least one check failed; the push is blocked |
//! | 2 | `CONFIG` | Invalid CLI arguments or configuration |
//! | 3 | `DISPATCH` | The run could not be carried out (log directory/file) |
//! | 4 | `HOOK` | Hook installation failed |
//!
//! `INTERNAL` shares the value 1 with `CHECKS_FAILED`: git only looks at
//! zero versus non-zero, and both block the push.

/// Exit codes matching the documented exit code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Every check passed or was skipped
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// At least one check failed
    pub const CHECKS_FAILED: ExitCode = ExitCode(1);

    /// General failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Configuration or CLI argument error
    pub const CONFIG: ExitCode = ExitCode(2);

    /// Dispatcher-fatal I/O error
    pub const DISPATCH: ExitCode = ExitCode(3);

    /// Hook installation error
    pub const HOOK: ExitCode = ExitCode(4);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values_are_stable() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::CHECKS_FAILED.as_i32(), 1);
        assert_eq!(ExitCode::CONFIG.as_i32(), 2);
        assert_eq!(ExitCode::DISPATCH.as_i32(), 3);
        assert_eq!(ExitCode::HOOK.as_i32(), 4);
    }

    #[test]
    fn test_exit_code_conversions() {
        let code: ExitCode = 3.into();
        assert_eq!(code, ExitCode::DISPATCH);
        assert_eq!(i32::from(ExitCode::CONFIG), 2);
        assert!(ExitCode::SUCCESS.is_success());
        assert!(!ExitCode::from_i32(1).is_success());
    }
}
