/*!
 * Initial User Stack
 *
 * Command-line parsing and the argument-vector layout a program entry
 * point expects. From high to low addresses:
 *
 * ```text
 * PHYS_BASE -> argument strings, last argument first, each word-aligned
 *              argv[argc] = 0
 *              argv[argc-1] .. argv[0]
 *              argv        (address of argv[0])
 *              argc
 * esp       -> return address 0
 * ```
 */

use super::types::{LoadError, ProcessError};
use crate::core::limits::{PGSIZE, PHYS_BASE, WORD_SIZE};
use crate::core::types::UserAddr;
use crate::memory::{MemoryError, MemoryResult, UserMemory};

/// Longest single argument string read back from a stack
const ARG_STRING_LIMIT: usize = PGSIZE;

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    argv: Vec<String>,
}

impl CommandLine {
    /// Split on runs of spaces and tabs; the first word names the program
    pub fn parse(line: &str, max_len: usize, max_args: usize) -> Result<Self, ProcessError> {
        if line.len() > max_len {
            return Err(ProcessError::InvalidCommand(format!(
                "command line is {} bytes, limit is {}",
                line.len(),
                max_len
            )));
        }
        let argv: Vec<String> = line
            .split([' ', '\t'])
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect();
        if argv.is_empty() {
            return Err(ProcessError::InvalidCommand("empty command line".into()));
        }
        if argv.len() > max_args {
            return Err(ProcessError::InvalidCommand(format!(
                "{} arguments, limit is {}",
                argv.len(),
                max_args
            )));
        }
        Ok(Self { argv })
    }

    #[inline]
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// All words, program name included
    #[inline]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

/// Where the entry point finds its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialStack {
    pub esp: UserAddr,
    pub argc: u32,
    pub argv: UserAddr,
}

#[inline]
const fn word_align(len: usize) -> usize {
    let word = WORD_SIZE as usize;
    (len + word - 1) / word * word
}

/// Bytes the layout for `argv` occupies
pub fn stack_bytes(argv: &[String]) -> usize {
    let strings: usize = argv.iter().map(|arg| word_align(arg.len() + 1)).sum();
    // argv[0..argc], the sentinel, argv, argc, return address
    strings + (argv.len() + 4) * WORD_SIZE as usize
}

/// Map the first stack page and lay out `argv` on it
pub fn setup_stack(memory: &mut UserMemory, argv: &[String]) -> Result<InitialStack, LoadError> {
    let needed = stack_bytes(argv);
    if needed > PGSIZE {
        return Err(LoadError::ArgumentsTooLarge { needed });
    }
    let page = PHYS_BASE - PGSIZE as u32;
    memory.map_range(page, PGSIZE).map_err(stack_fault)?;

    let mut esp = PHYS_BASE;
    let mut addresses = vec![0u32; argv.len()];
    for (index, arg) in argv.iter().enumerate().rev() {
        esp -= word_align(arg.len() + 1) as u32;
        let mut bytes = arg.as_bytes().to_vec();
        bytes.push(0);
        memory.write(esp, &bytes).map_err(stack_fault)?;
        addresses[index] = esp;
    }

    push_word(memory, &mut esp, 0)?;
    for &address in addresses.iter().rev() {
        push_word(memory, &mut esp, address)?;
    }
    let argv_addr = esp;
    push_word(memory, &mut esp, argv_addr)?;
    push_word(memory, &mut esp, argv.len() as u32)?;
    push_word(memory, &mut esp, 0)?;

    Ok(InitialStack {
        esp,
        argc: argv.len() as u32,
        argv: argv_addr,
    })
}

fn push_word(memory: &mut UserMemory, esp: &mut UserAddr, value: u32) -> Result<(), LoadError> {
    *esp -= WORD_SIZE;
    memory.write_u32(*esp, value).map_err(stack_fault)
}

fn stack_fault(err: MemoryError) -> LoadError {
    LoadError::StackFault(err.to_string())
}

/// Decode `argc`/`argv` as an entry point sees them at `esp`
pub fn read_args(memory: &UserMemory, esp: UserAddr) -> MemoryResult<Vec<String>> {
    let argc = memory.read_u32(esp + WORD_SIZE)?;
    let argv = memory.read_u32(esp + 2 * WORD_SIZE)?;
    (0..argc)
        .map(|i| {
            let pointer = memory.read_u32(argv + i * WORD_SIZE)?;
            memory.read_cstr(pointer, ARG_STRING_LIMIT)
        })
        .collect()
}
