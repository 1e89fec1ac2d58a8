/*!
 * Built-in Programs
 *
 * Small user programs shipped with the `kernel` binary. They use nothing
 * but the user-side syscall library.
 */

use crate::core::types::{ExitCode, STDOUT_FILENO};
use crate::process::ProgramTable;
use crate::syscalls::SyscallNumber;
use crate::userland::{UserResult, Userland};

const COPY_CHUNK: usize = 512;

/// Every built-in, ready to hand to the kernel
pub fn builtin_programs() -> ProgramTable {
    ProgramTable::new()
        .with_program("echo", echo)
        .with_program("cat", cat)
        .with_program("put", put)
        .with_program("rm", rm)
        .with_program("run", run)
        .with_program("exit", exit)
        .with_program("halt", halt)
        .with_program("fault", fault)
}

/// `echo [word...]`: print the words on one line
fn echo(user: &mut Userland<'_>) -> UserResult<ExitCode> {
    let args = user.args()?;
    let mut line = args[1..].join(" ");
    line.push('\n');
    user.print(&line)?;
    Ok(0)
}

/// `cat file...`: copy each file to the console
fn cat(user: &mut Userland<'_>) -> UserResult<ExitCode> {
    let args = user.args()?;
    let mut status = 0;
    for name in &args[1..] {
        let fd = user.open(name)?;
        if fd < 0 {
            user.print(&format!("cat: {name}: not found\n"))?;
            status = 1;
            continue;
        }
        let mut buf = [0u8; COPY_CHUNK];
        loop {
            let n = user.read(fd, &mut buf)?;
            if n <= 0 {
                break;
            }
            user.write(STDOUT_FILENO as i32, &buf[..n as usize])?;
        }
        user.close(fd)?;
    }
    Ok(status)
}

/// `put file word...`: create `file` holding the words
fn put(user: &mut Userland<'_>) -> UserResult<ExitCode> {
    let args = user.args()?;
    let Some(name) = args.get(1) else {
        user.print("usage: put file [word...]\n")?;
        return Ok(2);
    };
    let text = args[2..].join(" ");
    if !user.create(name, 0)? {
        user.print(&format!("put: cannot create {name}\n"))?;
        return Ok(1);
    }
    let fd = user.open(name)?;
    let written = user.write(fd, text.as_bytes())?;
    user.close(fd)?;
    Ok(if written as usize == text.len() { 0 } else { 1 })
}

/// `rm file...`: remove files
fn rm(user: &mut Userland<'_>) -> UserResult<ExitCode> {
    let args = user.args()?;
    let mut status = 0;
    for name in &args[1..] {
        if !user.remove(name)? {
            user.print(&format!("rm: {name}: not found\n"))?;
            status = 1;
        }
    }
    Ok(status)
}

/// `run command...`: exec the rest of the line and wait for it
fn run(user: &mut Userland<'_>) -> UserResult<ExitCode> {
    let args = user.args()?;
    let pid = user.exec(&args[1..].join(" "))?;
    if pid < 0 {
        return Ok(-1);
    }
    user.wait(pid)
}

/// `exit [code]`: terminate with `code` (default 0)
fn exit(user: &mut Userland<'_>) -> UserResult<ExitCode> {
    let args = user.args()?;
    let code = args.get(1).and_then(|arg| arg.parse().ok()).unwrap_or(0);
    Err(user.exit(code))
}

/// `halt`: power the machine off
fn halt(user: &mut Userland<'_>) -> UserResult<ExitCode> {
    Err(user.halt())
}

/// `fault`: hand the kernel an unmapped buffer
fn fault(user: &mut Userland<'_>) -> UserResult<ExitCode> {
    user.syscall(SyscallNumber::Write.code(), &[STDOUT_FILENO, 0, 16])?;
    Ok(0)
}
