/*!
 * User-Side Syscall Library
 *
 * What a user program links against. Every stub lays its arguments out on
 * the user stack (strings and buffers first, then the argument words and
 * the call number), traps into the kernel with a [`TrapFrame`] and reads
 * the result back out of `eax`.
 *
 * Stubs return `Err(Exited)` once the process is gone; a program propagates
 * it with `?` and never runs again.
 */

use crate::core::limits::{PGSIZE, PHYS_BASE, STACK_MAX_PAGES, WORD_SIZE};
use crate::core::types::{ExitCode, Pid, UserAddr, STDOUT_FILENO};
use crate::memory::{page_round_down, MemoryError};
use crate::process::stack::read_args;
use crate::process::{Exited, Kernel, Process};
use crate::syscalls::{SyscallNumber, TrapFrame};

/// Result of a user-side call
pub type UserResult<T> = Result<T, Exited>;

/// Lowest address the user stack may grow to
const STACK_LIMIT: UserAddr = PHYS_BASE - (STACK_MAX_PAGES * PGSIZE) as u32;

/// A running program's view of the kernel
pub struct Userland<'a> {
    kernel: &'a Kernel,
    process: &'a mut Process,
    /// Stack pointer call frames are built below
    base: UserAddr,
}

impl<'a> Userland<'a> {
    pub(crate) fn new(kernel: &'a Kernel, process: &'a mut Process) -> Self {
        let base = match process.entry_esp {
            0 => PHYS_BASE,
            esp => esp,
        };
        Self {
            kernel,
            process,
            base,
        }
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.process.id()
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.process.name()
    }

    #[inline]
    pub fn kernel(&self) -> &Kernel {
        self.kernel
    }

    #[inline]
    pub fn process(&self) -> &Process {
        self.process
    }

    /// `argv` as laid out on the initial stack, program name first
    pub fn args(&mut self) -> UserResult<Vec<String>> {
        if self.process.entry_esp == 0 {
            return Ok(vec![self.process.name().to_string()]);
        }
        match read_args(self.process.memory(), self.process.entry_esp) {
            Ok(args) => Ok(args),
            Err(err) => Err(self.kernel.fault(self.process, err)),
        }
    }

    /// Power the machine off
    pub fn halt(&mut self) -> Exited {
        match self.syscall(SyscallNumber::Halt.code(), &[]) {
            Err(exited) => exited,
            Ok(_) => self.kernel.halt(self.process),
        }
    }

    /// End this process with `status`
    pub fn exit(&mut self, status: ExitCode) -> Exited {
        match self.syscall(SyscallNumber::Exit.code(), &[status as u32]) {
            Err(exited) => exited,
            Ok(_) => self.kernel.terminate(self.process, status),
        }
    }

    /// Start a child from `cmd_line`; its id, or -1
    pub fn exec(&mut self, cmd_line: &str) -> UserResult<i32> {
        let mut sp = self.base;
        let line = self.push_str(&mut sp, cmd_line)?;
        self.call(sp, SyscallNumber::Exec, &[line])
    }

    /// Exit code of child `pid`, or -1
    pub fn wait(&mut self, pid: i32) -> UserResult<ExitCode> {
        self.call(self.base, SyscallNumber::Wait, &[pid as u32])
    }

    pub fn create(&mut self, name: &str, initial_size: u32) -> UserResult<bool> {
        let mut sp = self.base;
        let name = self.push_str(&mut sp, name)?;
        self.call(sp, SyscallNumber::Create, &[name, initial_size])
            .map(|flag| flag != 0)
    }

    pub fn remove(&mut self, name: &str) -> UserResult<bool> {
        let mut sp = self.base;
        let name = self.push_str(&mut sp, name)?;
        self.call(sp, SyscallNumber::Remove, &[name])
            .map(|flag| flag != 0)
    }

    /// Open `name`; a descriptor, or -1
    pub fn open(&mut self, name: &str) -> UserResult<i32> {
        let mut sp = self.base;
        let name = self.push_str(&mut sp, name)?;
        self.call(sp, SyscallNumber::Open, &[name])
    }

    pub fn filesize(&mut self, fd: i32) -> UserResult<i32> {
        self.call(self.base, SyscallNumber::Filesize, &[fd as u32])
    }

    /// Read into `buf`; bytes read, or -1
    pub fn read(&mut self, fd: i32, buf: &mut [u8]) -> UserResult<i32> {
        let mut sp = self.base;
        let addr = self.reserve(&mut sp, buf.len())?;
        let count = self.call(sp, SyscallNumber::Read, &[fd as u32, addr, buf.len() as u32])?;
        if count > 0 {
            let count = (count as usize).min(buf.len());
            if let Err(err) = self.process.memory().read(addr, &mut buf[..count]) {
                return Err(self.kernel.fault(self.process, err));
            }
        }
        Ok(count)
    }

    /// Write `data`; bytes written, or -1
    pub fn write(&mut self, fd: i32, data: &[u8]) -> UserResult<i32> {
        let mut sp = self.base;
        let addr = self.push_bytes(&mut sp, data)?;
        self.call(sp, SyscallNumber::Write, &[fd as u32, addr, data.len() as u32])
    }

    pub fn seek(&mut self, fd: i32, position: u32) -> UserResult<()> {
        self.call(self.base, SyscallNumber::Seek, &[fd as u32, position])
            .map(|_| ())
    }

    pub fn tell(&mut self, fd: i32) -> UserResult<u32> {
        self.call(self.base, SyscallNumber::Tell, &[fd as u32])
            .map(|position| position as u32)
    }

    pub fn close(&mut self, fd: i32) -> UserResult<()> {
        self.call(self.base, SyscallNumber::Close, &[fd as u32])
            .map(|_| ())
    }

    /// Write `text` to the console
    pub fn print(&mut self, text: &str) -> UserResult<()> {
        self.write(STDOUT_FILENO as i32, text.as_bytes())
            .map(|_| ())
    }

    /// Trap with a raw call number and argument words; returns `eax`
    ///
    /// Pointer arguments are taken as-is, so this is how a program hands the
    /// kernel an address it does not own.
    pub fn syscall(&mut self, code: u32, args: &[u32]) -> UserResult<u32> {
        self.trap(self.base, code, args)
    }

    fn call(&mut self, sp: UserAddr, number: SyscallNumber, args: &[u32]) -> UserResult<i32> {
        self.trap(sp, number.code(), args).map(|eax| eax as i32)
    }

    /// Push argument words and the call number below `sp`, then trap
    fn trap(&mut self, mut sp: UserAddr, code: u32, args: &[u32]) -> UserResult<u32> {
        for &word in args.iter().rev() {
            self.push_word(&mut sp, word)?;
        }
        self.push_word(&mut sp, code)?;
        let mut frame = TrapFrame::new(sp);
        self.kernel.syscall(self.process, &mut frame)?;
        Ok(frame.eax)
    }

    fn push_str(&mut self, sp: &mut UserAddr, text: &str) -> UserResult<UserAddr> {
        let mut bytes = Vec::with_capacity(text.len() + 1);
        bytes.extend_from_slice(text.as_bytes());
        bytes.push(0);
        self.push_bytes(sp, &bytes)
    }

    fn push_bytes(&mut self, sp: &mut UserAddr, bytes: &[u8]) -> UserResult<UserAddr> {
        let addr = self.reserve(sp, bytes.len())?;
        match self.process.memory_mut().write(addr, bytes) {
            Ok(()) => Ok(addr),
            Err(err) => Err(self.kernel.fault(self.process, err)),
        }
    }

    fn push_word(&mut self, sp: &mut UserAddr, word: u32) -> UserResult<()> {
        self.push_bytes(sp, &word.to_le_bytes()).map(|_| ())
    }

    /// Move `sp` down by `len` bytes, word-aligned, growing the stack as needed
    fn reserve(&mut self, sp: &mut UserAddr, len: usize) -> UserResult<UserAddr> {
        let low = u32::try_from(len)
            .ok()
            .and_then(|len| sp.checked_sub(len))
            .map(|addr| addr & !(WORD_SIZE - 1))
            .filter(|&addr| addr >= STACK_LIMIT);
        let Some(low) = low else {
            let err = MemoryError::StackOverflow { addr: *sp };
            return Err(self.kernel.fault(self.process, err));
        };
        let start = page_round_down(low);
        let span = (*sp - start) as usize;
        if let Err(err) = self.process.memory_mut().map_range(start, span) {
            return Err(self.kernel.fault(self.process, err));
        }
        *sp = low;
        Ok(low)
    }
}
