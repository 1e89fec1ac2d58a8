/*!
 * Syscall Result Types
 * What the dispatcher does with the caller once a handler is done
 */

use super::errors::SyscallError;
use crate::process::Exited;

/// Outcome of one handled call
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum SyscallResult {
    /// Store the value in `eax` and resume the caller
    Return(i32),
    /// Resume the caller without touching `eax`
    Resume,
    /// The caller has terminated
    Terminated(Exited),
    /// Protocol violation; the caller is killed with -1
    Fatal(SyscallError),
}

impl SyscallResult {
    #[inline]
    pub fn value(value: i32) -> Self {
        Self::Return(value)
    }

    /// Unsigned result; `eax` carries the raw bits
    #[inline]
    pub fn unsigned(value: u32) -> Self {
        Self::Return(value as i32)
    }

    /// Booleans travel as 1/0
    #[inline]
    pub fn flag(ok: bool) -> Self {
        Self::Return(i32::from(ok))
    }

    /// The -1 sentinel
    #[inline]
    pub fn failure() -> Self {
        Self::Return(-1)
    }

    #[inline]
    pub fn fatal(err: impl Into<SyscallError>) -> Self {
        Self::Fatal(err.into())
    }

    #[inline]
    pub fn returns_to_caller(&self) -> bool {
        matches!(self, Self::Return(_) | Self::Resume)
    }
}

impl From<Result<i32, SyscallError>> for SyscallResult {
    fn from(result: Result<i32, SyscallError>) -> Self {
        match result {
            Ok(value) => Self::Return(value),
            Err(err) => Self::Fatal(err),
        }
    }
}
