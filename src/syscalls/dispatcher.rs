/*!
 * Syscall Dispatcher
 *
 * Decodes one trap frame and routes the call to the handler registered for
 * its category, then applies the result to the frame or the caller.
 */

use super::frame::TrapFrame;
use super::handler::{SyscallContext, SyscallHandlerRegistry};
use super::handlers::{FileDescriptorHandler, FileSystemHandler, ProcessHandler, SystemHandler};
use super::types::{SyscallError, SyscallResult};
use crate::process::{Exited, Kernel, Process};
use std::sync::Arc;
use tracing::{debug_span, trace};

/// Routes decoded calls to handlers
#[derive(Clone)]
pub struct SyscallDispatcher {
    registry: SyscallHandlerRegistry,
}

impl Default for SyscallDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SyscallDispatcher {
    /// Dispatcher with every built-in handler registered
    pub fn new() -> Self {
        let registry = SyscallHandlerRegistry::new()
            .register(Arc::new(ProcessHandler))
            .register(Arc::new(FileDescriptorHandler))
            .register(Arc::new(FileSystemHandler))
            .register(Arc::new(SystemHandler));
        Self::with_registry(registry)
    }

    pub fn with_registry(registry: SyscallHandlerRegistry) -> Self {
        Self { registry }
    }

    #[inline]
    pub fn registry(&self) -> &SyscallHandlerRegistry {
        &self.registry
    }

    /// Handle one trap from `process`
    ///
    /// `Ok` means the caller resumes (with `eax` set when the call returns a
    /// value); `Err` means it no longer exists.
    pub fn dispatch(
        &self,
        kernel: &Kernel,
        process: &mut Process,
        frame: &mut TrapFrame,
    ) -> Result<(), Exited> {
        let syscall = match frame.decode(process.memory()) {
            Ok(syscall) => syscall,
            Err(err) => {
                if let SyscallError::UnknownSyscall(code) = err {
                    kernel.metrics().record_unknown(code);
                }
                return Err(kernel.fault(process, err));
            }
        };

        let number = syscall.number();
        kernel.metrics().record(number);
        let span = debug_span!("syscall", pid = process.id(), call = number.name());
        let _entered = span.enter();

        let result = {
            let mut ctx = SyscallContext::new(kernel, &mut *process);
            self.registry
                .dispatch(&mut ctx, &syscall)
                .unwrap_or(SyscallResult::Fatal(SyscallError::Unhandled(number)))
        };

        match result {
            SyscallResult::Return(value) => {
                trace!(value, "returning");
                frame.set_return(value);
                Ok(())
            }
            SyscallResult::Resume => Ok(()),
            SyscallResult::Terminated(exited) => Err(exited),
            SyscallResult::Fatal(err) => Err(kernel.fault(process, err)),
        }
    }
}
