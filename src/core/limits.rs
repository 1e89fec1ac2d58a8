/*!
 * System Limits and Constants
 *
 * Machine constants and default limits, grouped by domain.
 */

// =============================================================================
// MACHINE
// =============================================================================

/// Page size of the simulated machine (4KB)
pub const PGSIZE: usize = 4096;

/// Top of the user address space; the initial stack grows down from here
pub const PHYS_BASE: u32 = 0xC000_0000;

/// Word size of the trap-frame argument convention
pub const WORD_SIZE: u32 = 4;

/// Maximum number of pages the user stack may grow to (8MB)
pub const STACK_MAX_PAGES: usize = 2048;

// =============================================================================
// TRAP FRAME
// =============================================================================

/// Byte offset of the call code from the frame's stack pointer
pub const ARG_CODE: u32 = 0;

/// Byte offset of the first argument
pub const ARG_1: u32 = 4;

/// Byte offset of the second argument
pub const ARG_2: u32 = 8;

/// Byte offset of the third argument
pub const ARG_3: u32 = 12;

// =============================================================================
// FILESYSTEM
// =============================================================================

/// Longest file name the in-memory filesystem accepts
pub const NAME_MAX: usize = 14;

/// Default bytes the in-memory filesystem may hold across all files (64 MiB)
pub const DEFAULT_MAX_FS_BYTES: usize = 64 * 1024 * 1024;

// =============================================================================
// PROCESS DEFAULTS
// =============================================================================

/// Default per-process open file limit
pub const DEFAULT_MAX_OPEN_FILES: usize = 128;

/// Default longest command line accepted by exec (one page)
pub const DEFAULT_MAX_COMMAND_LINE: usize = PGSIZE;

/// Default most words accepted on a command line
pub const DEFAULT_MAX_ARGS: usize = 64;

/// Default largest chunk handed to the console in one call
/// Keeps lines from different processes from interleaving mid-buffer
pub const DEFAULT_CONSOLE_CHUNK: usize = 256;
