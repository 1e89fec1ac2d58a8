/*!
 * Syscall Error Types
 * Protocol violations that terminate the calling process
 */

use super::syscall::SyscallNumber;
use crate::core::types::Fd;
use crate::memory::MemoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal syscall errors
///
/// Ordinary failures (a missing file, a bad wait) are sentinel return values
/// and never show up here.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
#[non_exhaustive]
pub enum SyscallError {
    /// Call number outside the fixed table
    #[error("Unknown system call {0}")]
    UnknownSyscall(u32),

    /// A frame word or pointer argument touched memory the process does not own
    #[error("Bad user memory access: {0}")]
    BadAddress(#[from] MemoryError),

    /// Data transfer or size query on a descriptor that is not open
    #[error("{call} on descriptor {fd}, which is not open")]
    BadDescriptor { call: SyscallNumber, fd: Fd },

    /// Reading the output console or writing the input console
    #[error("{call} is not permitted on descriptor {fd}")]
    WrongDirection { call: SyscallNumber, fd: Fd },

    /// No registered handler accepted the call
    #[error("No handler for {0}")]
    Unhandled(SyscallNumber),
}

impl SyscallError {
    #[inline]
    pub fn bad_descriptor(call: SyscallNumber, fd: Fd) -> Self {
        Self::BadDescriptor { call, fd }
    }

    #[inline]
    pub fn wrong_direction(call: SyscallNumber, fd: Fd) -> Self {
        Self::WrongDirection { call, fd }
    }
}
