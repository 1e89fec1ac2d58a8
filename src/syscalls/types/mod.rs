/*!
 * Syscall Types Module
 * Call numbers, decoded calls, errors and results
 */

mod errors;
mod results;
mod syscall;

// Re-export all public types
pub use errors::SyscallError;
pub use results::SyscallResult;
pub use syscall::{Syscall, SyscallNumber};
