/*!
 * Trap Frame
 *
 * Register state captured when user code traps into the kernel. The call
 * number sits at `esp`, followed by up to three argument words; the result
 * goes back in `eax`.
 */

use super::types::{Syscall, SyscallError, SyscallNumber};
use crate::core::limits::{ARG_1, ARG_2, ARG_3, ARG_CODE};
use crate::core::types::UserAddr;
use crate::memory::{MemoryError, MemoryResult, UserMemory};

const ARG_OFFSETS: [u32; 3] = [ARG_1, ARG_2, ARG_3];

/// Saved user registers relevant to a system call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    /// User stack pointer at the trap
    pub esp: UserAddr,
    /// Accumulator; receives the return value
    pub eax: u32,
}

impl TrapFrame {
    #[inline]
    pub const fn new(esp: UserAddr) -> Self {
        Self { esp, eax: 0 }
    }

    /// Read the word at `offset` bytes above `esp`
    pub fn word(&self, memory: &UserMemory, offset: u32) -> MemoryResult<u32> {
        let addr = self
            .esp
            .checked_add(offset)
            .ok_or(MemoryError::KernelAddress { addr: self.esp })?;
        memory.read_u32(addr)
    }

    /// Decode the call number and as many arguments as the call takes
    pub fn decode(&self, memory: &UserMemory) -> Result<Syscall, SyscallError> {
        let number = SyscallNumber::try_from(self.word(memory, ARG_CODE)?)?;
        let mut args = [0u32; 3];
        for (slot, &offset) in args.iter_mut().zip(&ARG_OFFSETS).take(number.arity()) {
            *slot = self.word(memory, offset)?;
        }
        Ok(Syscall::from_words(number, args))
    }

    #[inline]
    pub fn set_return(&mut self, value: i32) {
        self.eax = value as u32;
    }

    /// `eax` reinterpreted as a signed result
    #[inline]
    pub fn return_value(&self) -> i32 {
        self.eax as i32
    }
}
