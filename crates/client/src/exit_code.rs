//! Process exit statuses for s3bulk runs.
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! |  0   | every file transferred                                     |
//! |  1   | at least one file failed, or the run was cancelled         |
//! |  2   | setup, configuration, usage or enumeration error           |

use std::fmt;

use engine::RunSummary;

/// Exit statuses returned by the `s3bulk` binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Every planned transfer succeeded.
    Ok = 0,

    /// Some transfers failed or the run was interrupted.
    PartialTransfer = 1,

    /// Nothing was transferred because the run could not be set up.
    ///
    /// Covers invalid arguments, unreadable configuration, a missing `aws`
    /// binary and enumeration failures.
    Setup = 2,
}

impl ExitCode {
    /// Returns the numeric exit code value.
    ///
    /// ```
    /// use client::ExitCode;
    ///
    /// assert_eq!(ExitCode::PartialTransfer.as_i32(), 1);
    /// ```
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns a short description of the code.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::PartialTransfer => "partial transfer",
            Self::Setup => "setup error",
        }
    }

    /// Returns `true` for [`ExitCode::Ok`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Creates an exit code from its numeric value.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::PartialTransfer),
            2 => Some(Self::Setup),
            _ => None,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code.as_i32().clamp(0, 255) as u8)
    }
}

/// Types that determine a process exit status.
pub trait HasExitCode {
    /// Returns the exit status this value should produce.
    fn exit_code(&self) -> ExitCode;
}

impl HasExitCode for RunSummary {
    fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::Ok
        } else {
            ExitCode::PartialTransfer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{Direction, ResultAggregator};

    #[test]
    fn numeric_values_round_trip() {
        for code in [ExitCode::Ok, ExitCode::PartialTransfer, ExitCode::Setup] {
            assert_eq!(ExitCode::from_i32(code.as_i32()), Some(code));
        }
        assert_eq!(ExitCode::from_i32(23), None);
    }

    #[test]
    fn empty_summary_is_success() {
        let summary = ResultAggregator::new(0, Direction::Upload).finalize(false);
        assert_eq!(summary.exit_code(), ExitCode::Ok);
    }

    #[test]
    fn cancelled_summary_is_partial() {
        let summary = ResultAggregator::new(0, Direction::Upload).finalize(true);
        assert_eq!(summary.exit_code(), ExitCode::PartialTransfer);
        assert_eq!(i32::from(summary.exit_code()), 1);
    }
}
