/*!
 * User-Process Kernel Library
 *
 * The user-process layer of a teaching kernel, hosted on OS threads:
 * system call dispatch, per-process descriptor tables, and the
 * exec / wait / exit lifecycle with a one-shot exit rendezvous.
 */

pub mod core;
pub mod devices;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod programs;
pub mod syscalls;
pub mod userland;
pub mod vfs;

// Re-exports
pub use crate::core::{ExitCode, Fd, KernelConfig, KernelError, KernelResult, Pid};
pub use devices::{BufferConsole, Console, PowerControl, SoftPower, StdConsole};
pub use memory::{MemoryError, UserMemory};
pub use monitoring::{init_tracing, MetricsSnapshot, SyscallMetrics};
pub use process::{
    Exited, Kernel, KernelBuilder, Process, ProcessError, ProcessInfo, ProcessState,
    ProgramLoader, ProgramTable, WaitError,
};
pub use programs::builtin_programs;
pub use syscalls::{Syscall, SyscallDispatcher, SyscallError, SyscallNumber, TrapFrame};
pub use userland::{UserResult, Userland};
pub use vfs::{FileHandle, FileSystem, MemFs, VfsError};
