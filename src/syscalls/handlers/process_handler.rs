/*!
 * Process Syscall Handler
 * Handles exit, exec and wait
 */

use super::user_string;
use crate::core::types::{ExitCode, Pid, UserAddr, EXIT_FAILURE, TID_ERROR};
use crate::syscalls::handler::{SyscallContext, SyscallHandler};
use crate::syscalls::types::{Syscall, SyscallResult};
use tracing::debug;

/// Handler for process lifecycle syscalls
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessHandler;

impl ProcessHandler {
    fn exit(&self, ctx: &mut SyscallContext<'_>, status: ExitCode) -> SyscallResult {
        SyscallResult::Terminated(ctx.kernel.terminate(ctx.process, status))
    }

    fn exec(&self, ctx: &mut SyscallContext<'_>, cmd_line: UserAddr) -> SyscallResult {
        let limit = ctx.kernel.config().max_command_line;
        let line = match user_string(ctx.process.memory(), cmd_line, limit) {
            Ok(Some(line)) => line,
            Ok(None) => return SyscallResult::value(TID_ERROR),
            Err(err) => return SyscallResult::fatal(err),
        };
        match ctx.kernel.spawn(ctx.process, &line) {
            Ok(pid) => SyscallResult::value(pid as i32),
            Err(err) => {
                debug!(pid = ctx.process.id(), error = %err, "exec failed");
                SyscallResult::value(TID_ERROR)
            }
        }
    }

    fn wait(&self, ctx: &mut SyscallContext<'_>, pid: Pid) -> SyscallResult {
        match ctx.kernel.wait(ctx.process, pid) {
            Ok(code) => SyscallResult::value(code),
            Err(err) => {
                debug!(pid = ctx.process.id(), error = %err, "wait refused");
                SyscallResult::value(EXIT_FAILURE)
            }
        }
    }
}

impl SyscallHandler for ProcessHandler {
    #[inline]
    fn handle(&self, ctx: &mut SyscallContext<'_>, syscall: &Syscall) -> Option<SyscallResult> {
        match *syscall {
            Syscall::Exit { status } => Some(self.exit(ctx, status)),
            Syscall::Exec { cmd_line } => Some(self.exec(ctx, cmd_line)),
            Syscall::Wait { pid } => Some(self.wait(ctx, pid)),
            _ => None,
        }
    }

    #[inline]
    fn name(&self) -> &'static str {
        "process_handler"
    }
}
