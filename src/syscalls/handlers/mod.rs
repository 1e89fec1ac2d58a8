/*!
 * Syscall Handlers Module
 * Contains all syscall category handlers
 */

mod fd_handler;
mod fs_handler;
mod process_handler;
mod system_handler;

pub use fd_handler::FileDescriptorHandler;
pub use fs_handler::FileSystemHandler;
pub use process_handler::ProcessHandler;
pub use system_handler::SystemHandler;

use super::types::SyscallError;
use crate::core::types::UserAddr;
use crate::memory::{MemoryError, UserMemory};

/// Read a string argument
///
/// `Ok(None)` when it is longer than `limit`; a fault is an error.
fn user_string(
    memory: &UserMemory,
    addr: UserAddr,
    limit: usize,
) -> Result<Option<String>, SyscallError> {
    match memory.read_cstr(addr, limit) {
        Ok(text) => Ok(Some(text)),
        Err(MemoryError::StringTooLong { .. }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
