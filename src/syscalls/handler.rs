/*!
 * Syscall Handler Trait
 * Defines the interface for syscall handlers and handler registration
 */

use super::types::{Syscall, SyscallResult};
use crate::process::{Kernel, Process};
use std::sync::Arc;

/// The calling process and the kernel it trapped into
///
/// Handlers see only the process that made the call.
pub struct SyscallContext<'a> {
    pub kernel: &'a Kernel,
    pub process: &'a mut Process,
}

impl<'a> SyscallContext<'a> {
    #[inline]
    pub fn new(kernel: &'a Kernel, process: &'a mut Process) -> Self {
        Self { kernel, process }
    }
}

/// Trait for handling individual syscalls
/// Each syscall category (fs, fd, process, system) implements this
pub trait SyscallHandler: Send + Sync {
    /// Handle a syscall, or return `None` if it belongs to another category
    fn handle(&self, ctx: &mut SyscallContext<'_>, syscall: &Syscall) -> Option<SyscallResult>;

    /// Get the name of this handler (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Registry for syscall handlers
/// Dispatches syscalls to appropriate handlers based on type
#[derive(Clone, Default)]
pub struct SyscallHandlerRegistry {
    handlers: Arc<Vec<Arc<dyn SyscallHandler>>>,
}

impl SyscallHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler in the registry
    pub fn register(mut self, handler: Arc<dyn SyscallHandler>) -> Self {
        Arc::make_mut(&mut self.handlers).push(handler);
        self
    }

    /// Dispatch a syscall to the first handler that accepts it
    pub fn dispatch(&self, ctx: &mut SyscallContext<'_>, syscall: &Syscall) -> Option<SyscallResult> {
        self.handlers
            .iter()
            .find_map(|handler| handler.handle(ctx, syscall))
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Handler names in registration order
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }
}
