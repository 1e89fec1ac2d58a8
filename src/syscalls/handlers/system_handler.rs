/*!
 * System Syscall Handler
 * Handles machine-wide operations
 */

use crate::syscalls::handler::{SyscallContext, SyscallHandler};
use crate::syscalls::types::{Syscall, SyscallResult};

/// Handler for `halt`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHandler;

impl SyscallHandler for SystemHandler {
    #[inline]
    fn handle(&self, ctx: &mut SyscallContext<'_>, syscall: &Syscall) -> Option<SyscallResult> {
        match syscall {
            Syscall::Halt => Some(SyscallResult::Terminated(ctx.kernel.halt(ctx.process))),
            _ => None,
        }
    }

    #[inline]
    fn name(&self) -> &'static str {
        "system_handler"
    }
}
