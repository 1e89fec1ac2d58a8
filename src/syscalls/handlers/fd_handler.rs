/*!
 * File Descriptor Syscall Handler
 *
 * Handles open and every call that takes a descriptor. Descriptors 0 and 1
 * are the console and are routed here before the table is consulted.
 *
 * Data transfer and size queries on a descriptor that is not open kill the
 * caller; seek, tell and close treat it as a no-op.
 */

use super::user_string;
use crate::core::limits::PGSIZE;
use crate::core::types::{Fd, UserAddr, STDIN_FILENO, STDOUT_FILENO};
use crate::process::DescriptorError;
use crate::syscalls::handler::{SyscallContext, SyscallHandler};
use crate::syscalls::types::{Syscall, SyscallError, SyscallNumber, SyscallResult};
use tracing::debug;

/// Handler for file descriptor syscalls
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDescriptorHandler;

impl FileDescriptorHandler {
    fn open(&self, ctx: &mut SyscallContext<'_>, name: UserAddr) -> SyscallResult {
        let name = match user_string(ctx.process.memory(), name, PGSIZE) {
            Ok(Some(name)) => name,
            Ok(None) => return SyscallResult::failure(),
            Err(err) => return SyscallResult::fatal(err),
        };
        match ctx.process.descriptors.open(ctx.kernel.filesystem(), &name) {
            Ok(fd) => SyscallResult::value(fd as i32),
            Err(err) => {
                debug!(name = %name, error = %err, "open failed");
                SyscallResult::failure()
            }
        }
    }

    fn filesize(&self, ctx: &mut SyscallContext<'_>, fd: Fd) -> SyscallResult {
        match ctx.process.descriptors.file_size(fd) {
            // Never let a large length alias the -1 sentinel
            Ok(size) => SyscallResult::value(i32::try_from(size).unwrap_or(i32::MAX)),
            Err(DescriptorError::NotOpen(_)) => {
                SyscallResult::fatal(SyscallError::bad_descriptor(SyscallNumber::Filesize, fd))
            }
            Err(_) => SyscallResult::failure(),
        }
    }

    fn read(&self, ctx: &mut SyscallContext<'_>, fd: Fd, buffer: UserAddr, length: u32) -> SyscallResult {
        let len = length as usize;
        if fd == STDOUT_FILENO {
            return SyscallResult::fatal(SyscallError::wrong_direction(SyscallNumber::Read, fd));
        }
        if fd != STDIN_FILENO && !ctx.process.descriptors.is_open(fd) {
            return SyscallResult::fatal(SyscallError::bad_descriptor(SyscallNumber::Read, fd));
        }
        if let Err(err) = ctx.process.memory.check_mapped(buffer, len) {
            return SyscallResult::fatal(err);
        }

        let data: Vec<u8> = if fd == STDIN_FILENO {
            let console = ctx.kernel.console();
            (0..len).map(|_| console.get_byte()).collect()
        } else {
            let mut data = vec![0u8; len];
            match ctx.process.descriptors.read(fd, &mut data) {
                Ok(n) => data.truncate(n),
                Err(err) => {
                    debug!(fd, error = %err, "read failed");
                    return SyscallResult::failure();
                }
            }
            data
        };

        match ctx.process.memory.write(buffer, &data) {
            Ok(()) => SyscallResult::value(data.len() as i32),
            Err(err) => SyscallResult::fatal(err),
        }
    }

    fn write(&self, ctx: &mut SyscallContext<'_>, fd: Fd, buffer: UserAddr, length: u32) -> SyscallResult {
        if fd == STDIN_FILENO {
            return SyscallResult::fatal(SyscallError::wrong_direction(SyscallNumber::Write, fd));
        }
        if fd != STDOUT_FILENO && !ctx.process.descriptors.is_open(fd) {
            return SyscallResult::fatal(SyscallError::bad_descriptor(SyscallNumber::Write, fd));
        }
        let data = match ctx.process.memory.read_bytes(buffer, length as usize) {
            Ok(data) => data,
            Err(err) => return SyscallResult::fatal(err),
        };

        if fd == STDOUT_FILENO {
            ctx.kernel.write_console(&data);
            return SyscallResult::value(data.len() as i32);
        }
        match ctx.process.descriptors.write(fd, &data) {
            Ok(n) => SyscallResult::value(n as i32),
            Err(err) => {
                debug!(fd, error = %err, "write failed");
                SyscallResult::failure()
            }
        }
    }

    fn seek(&self, ctx: &mut SyscallContext<'_>, fd: Fd, position: u32) -> SyscallResult {
        if let Err(err) = ctx.process.descriptors.seek(fd, u64::from(position)) {
            debug!(fd, error = %err, "seek ignored");
        }
        SyscallResult::Resume
    }

    fn tell(&self, ctx: &mut SyscallContext<'_>, fd: Fd) -> SyscallResult {
        let position = ctx.process.descriptors.tell(fd).unwrap_or(0);
        SyscallResult::unsigned(u32::try_from(position).unwrap_or(u32::MAX))
    }

    fn close(&self, ctx: &mut SyscallContext<'_>, fd: Fd) -> SyscallResult {
        if !ctx.process.descriptors.close(fd) {
            debug!(fd, "close on descriptor that is not open");
        }
        SyscallResult::Resume
    }
}

impl SyscallHandler for FileDescriptorHandler {
    #[inline]
    fn handle(&self, ctx: &mut SyscallContext<'_>, syscall: &Syscall) -> Option<SyscallResult> {
        match *syscall {
            Syscall::Open { name } => Some(self.open(ctx, name)),
            Syscall::Filesize { fd } => Some(self.filesize(ctx, fd)),
            Syscall::Read { fd, buffer, length } => Some(self.read(ctx, fd, buffer, length)),
            Syscall::Write { fd, buffer, length } => Some(self.write(ctx, fd, buffer, length)),
            Syscall::Seek { fd, position } => Some(self.seek(ctx, fd, position)),
            Syscall::Tell { fd } => Some(self.tell(ctx, fd)),
            Syscall::Close { fd } => Some(self.close(ctx, fd)),
            _ => None,
        }
    }

    #[inline]
    fn name(&self) -> &'static str {
        "fd_handler"
    }
}
