/*!
 * Syscalls Module
 * Trap-frame decoding and system call dispatch
 */

pub mod dispatcher;
pub mod frame;
pub mod handler;
pub mod handlers;
pub mod types;

// Re-export public API
pub use dispatcher::SyscallDispatcher;
pub use frame::TrapFrame;
pub use handler::{SyscallContext, SyscallHandler, SyscallHandlerRegistry};
pub use types::{Syscall, SyscallError, SyscallNumber, SyscallResult};
