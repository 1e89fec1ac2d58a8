/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use thiserror::Error;

pub use crate::memory::MemoryError;
pub use crate::process::ProcessError;
pub use crate::syscalls::types::SyscallError;
pub use crate::vfs::VfsError;

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Memory error: {0}")]
    #[diagnostic(
        code(kernel::memory),
        help("A user address was not mapped. The process is terminated with -1.")
    )]
    Memory(#[from] MemoryError),

    #[error("Process error: {0}")]
    #[diagnostic(
        code(kernel::process),
        help("Check that the program is registered with the loader and the command line is valid.")
    )]
    Process(#[from] ProcessError),

    #[error("Filesystem error: {0}")]
    #[diagnostic(code(kernel::vfs))]
    Vfs(#[from] VfsError),

    #[error("Syscall error: {0}")]
    #[diagnostic(code(kernel::syscall))]
    Syscall(#[from] SyscallError),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(kernel::configuration_error),
        help("Review KERNEL_CONFIG and the KERNEL_* environment overrides.")
    )]
    Configuration(String),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(kernel::io_error),
        help("Host filesystem or console operation failed.")
    )]
    Io(String),
}

impl From<std::io::Error> for KernelError {
    fn from(err: std::io::Error) -> Self {
        KernelError::Io(err.to_string())
    }
}
