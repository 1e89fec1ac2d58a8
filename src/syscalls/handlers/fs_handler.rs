/*!
 * File System Syscall Handler
 * Handles create and remove, which work on names rather than descriptors
 */

use super::user_string;
use crate::core::limits::PGSIZE;
use crate::core::types::UserAddr;
use crate::syscalls::handler::{SyscallContext, SyscallHandler};
use crate::syscalls::types::{Syscall, SyscallResult};
use tracing::debug;

/// Handler for file system syscalls
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemHandler;

impl FileSystemHandler {
    fn create(&self, ctx: &mut SyscallContext<'_>, name: UserAddr, initial_size: u32) -> SyscallResult {
        let name = match user_string(ctx.process.memory(), name, PGSIZE) {
            Ok(Some(name)) => name,
            Ok(None) => return SyscallResult::flag(false),
            Err(err) => return SyscallResult::fatal(err),
        };
        match ctx.kernel.filesystem().create(&name, u64::from(initial_size)) {
            Ok(()) => SyscallResult::flag(true),
            Err(err) => {
                debug!(name = %name, error = %err, "create failed");
                SyscallResult::flag(false)
            }
        }
    }

    fn remove(&self, ctx: &mut SyscallContext<'_>, name: UserAddr) -> SyscallResult {
        let name = match user_string(ctx.process.memory(), name, PGSIZE) {
            Ok(Some(name)) => name,
            Ok(None) => return SyscallResult::flag(false),
            Err(err) => return SyscallResult::fatal(err),
        };
        SyscallResult::flag(ctx.kernel.filesystem().remove(&name).is_ok())
    }
}

impl SyscallHandler for FileSystemHandler {
    #[inline]
    fn handle(&self, ctx: &mut SyscallContext<'_>, syscall: &Syscall) -> Option<SyscallResult> {
        match *syscall {
            Syscall::Create { name, initial_size } => Some(self.create(ctx, name, initial_size)),
            Syscall::Remove { name } => Some(self.remove(ctx, name)),
            _ => None,
        }
    }

    #[inline]
    fn name(&self) -> &'static str {
        "fs_handler"
    }
}
