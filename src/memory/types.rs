/*!
 * Memory Types
 * Errors raised by user address space accesses
 */

use crate::core::types::UserAddr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// User memory errors
///
/// Every variant is a fault from the process's point of view: the access
/// touched something the process does not own.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "error_type")]
pub enum MemoryError {
    #[error("Page fault at 0x{addr:08x}")]
    PageFault { addr: UserAddr },

    #[error("Access to kernel address 0x{addr:08x}")]
    KernelAddress { addr: UserAddr },

    #[error("String at 0x{addr:08x} longer than {limit} bytes")]
    StringTooLong { addr: UserAddr, limit: usize },

    #[error("User stack exhausted at 0x{addr:08x}")]
    StackOverflow { addr: UserAddr },
}

impl MemoryError {
    /// Faulting address
    #[inline]
    pub const fn addr(&self) -> UserAddr {
        match self {
            Self::PageFault { addr }
            | Self::KernelAddress { addr }
            | Self::StringTooLong { addr, .. }
            | Self::StackOverflow { addr } => *addr,
        }
    }
}
