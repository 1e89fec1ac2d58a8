/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process ID type
pub type Pid = u32;

/// File descriptor type
pub type Fd = u32;

/// User virtual address
pub type UserAddr = u32;

/// Exit status of a process
pub type ExitCode = i32;

/// Common result type for kernel operations
pub type KernelResult<T> = Result<T, super::errors::KernelError>;

/// Exit code recorded for a process that never called `exit` successfully
pub const EXIT_FAILURE: ExitCode = -1;

/// Value returned by `exec` when no process could be started
pub const TID_ERROR: i32 = -1;

/// Descriptor reserved for console input
pub const STDIN_FILENO: Fd = 0;

/// Descriptor reserved for console output
pub const STDOUT_FILENO: Fd = 1;

/// First descriptor handed out by `open`
pub const FIRST_FILE_FD: Fd = 2;
