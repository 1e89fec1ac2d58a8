/*!
 * Syscall Enum
 * Call numbers and decoded system calls
 */

use super::errors::SyscallError;
use crate::core::types::{ExitCode, Fd, Pid, UserAddr};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Call numbers, as pushed by user code at the top of the trap frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum SyscallNumber {
    Halt = 0,
    Exit = 1,
    Exec = 2,
    Wait = 3,
    Create = 4,
    Remove = 5,
    Open = 6,
    Filesize = 7,
    Read = 8,
    Write = 9,
    Seek = 10,
    Tell = 11,
    Close = 12,
}

impl SyscallNumber {
    pub const ALL: [SyscallNumber; 13] = [
        Self::Halt,
        Self::Exit,
        Self::Exec,
        Self::Wait,
        Self::Create,
        Self::Remove,
        Self::Open,
        Self::Filesize,
        Self::Read,
        Self::Write,
        Self::Seek,
        Self::Tell,
        Self::Close,
    ];

    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Halt => "halt",
            Self::Exit => "exit",
            Self::Exec => "exec",
            Self::Wait => "wait",
            Self::Create => "create",
            Self::Remove => "remove",
            Self::Open => "open",
            Self::Filesize => "filesize",
            Self::Read => "read",
            Self::Write => "write",
            Self::Seek => "seek",
            Self::Tell => "tell",
            Self::Close => "close",
        }
    }

    /// Number of argument words following the call number
    pub const fn arity(self) -> usize {
        match self {
            Self::Halt => 0,
            Self::Exit
            | Self::Exec
            | Self::Wait
            | Self::Remove
            | Self::Open
            | Self::Filesize
            | Self::Tell
            | Self::Close => 1,
            Self::Create | Self::Seek => 2,
            Self::Read | Self::Write => 3,
        }
    }
}

impl fmt::Display for SyscallNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for SyscallNumber {
    type Error = SyscallError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(SyscallError::UnknownSyscall(code))
    }
}

/// A decoded system call; pointer arguments are still user addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "syscall")]
pub enum Syscall {
    Halt,
    Exit { status: ExitCode },
    Exec { cmd_line: UserAddr },
    Wait { pid: Pid },
    Create { name: UserAddr, initial_size: u32 },
    Remove { name: UserAddr },
    Open { name: UserAddr },
    Filesize { fd: Fd },
    Read { fd: Fd, buffer: UserAddr, length: u32 },
    Write { fd: Fd, buffer: UserAddr, length: u32 },
    Seek { fd: Fd, position: u32 },
    Tell { fd: Fd },
    Close { fd: Fd },
}

impl Syscall {
    /// Build a call from its number and raw argument words
    ///
    /// Words beyond the call's arity are ignored.
    pub fn from_words(number: SyscallNumber, args: [u32; 3]) -> Self {
        let [a, b, c] = args;
        match number {
            SyscallNumber::Halt => Self::Halt,
            SyscallNumber::Exit => Self::Exit { status: a as i32 },
            SyscallNumber::Exec => Self::Exec { cmd_line: a },
            SyscallNumber::Wait => Self::Wait { pid: a },
            SyscallNumber::Create => Self::Create {
                name: a,
                initial_size: b,
            },
            SyscallNumber::Remove => Self::Remove { name: a },
            SyscallNumber::Open => Self::Open { name: a },
            SyscallNumber::Filesize => Self::Filesize { fd: a },
            SyscallNumber::Read => Self::Read {
                fd: a,
                buffer: b,
                length: c,
            },
            SyscallNumber::Write => Self::Write {
                fd: a,
                buffer: b,
                length: c,
            },
            SyscallNumber::Seek => Self::Seek { fd: a, position: b },
            SyscallNumber::Tell => Self::Tell { fd: a },
            SyscallNumber::Close => Self::Close { fd: a },
        }
    }

    pub const fn number(&self) -> SyscallNumber {
        match self {
            Self::Halt => SyscallNumber::Halt,
            Self::Exit { .. } => SyscallNumber::Exit,
            Self::Exec { .. } => SyscallNumber::Exec,
            Self::Wait { .. } => SyscallNumber::Wait,
            Self::Create { .. } => SyscallNumber::Create,
            Self::Remove { .. } => SyscallNumber::Remove,
            Self::Open { .. } => SyscallNumber::Open,
            Self::Filesize { .. } => SyscallNumber::Filesize,
            Self::Read { .. } => SyscallNumber::Read,
            Self::Write { .. } => SyscallNumber::Write,
            Self::Seek { .. } => SyscallNumber::Seek,
            Self::Tell { .. } => SyscallNumber::Tell,
            Self::Close { .. } => SyscallNumber::Close,
        }
    }
}
