/*!
 * Raw trap frame tests
 * Hand-built frames pushed through the kernel's trap entry point
 */

use crate::common::Harness;
use pretty_assertions::assert_eq;
use userprog_kernel::core::limits::{PGSIZE, PHYS_BASE};
use userprog_kernel::{Process, SyscallNumber, TrapFrame};

const PAGE: u32 = PHYS_BASE - PGSIZE as u32;

fn root(h: &Harness) -> Process {
    let mut process = h.kernel.create_root_process("caller");
    process.memory_mut().map_range(PAGE, PGSIZE).unwrap();
    process
}

fn frame(process: &mut Process, words: &[u32]) -> TrapFrame {
    let esp = PAGE + 0x100;
    for (i, word) in words.iter().enumerate() {
        process.memory_mut().write_u32(esp + 4 * i as u32, *word).unwrap();
    }
    TrapFrame::new(esp)
}

#[test]
fn test_return_value_lands_in_eax() {
    let h = Harness::new();
    let mut process = root(&h);
    let name = PAGE + 0x800;
    process.memory_mut().write(name, b"missing\0").unwrap();

    let mut trap = frame(&mut process, &[SyscallNumber::Open.code(), name]);
    h.kernel.syscall(&mut process, &mut trap).unwrap();
    assert_eq!(trap.eax, 0xFFFF_FFFF);

    h.fs.put("present", b"").unwrap();
    process.memory_mut().write(name, b"present\0").unwrap();
    let mut trap = frame(&mut process, &[SyscallNumber::Open.code(), name]);
    h.kernel.syscall(&mut process, &mut trap).unwrap();
    assert_eq!(trap.return_value(), 2);
}

#[test]
fn test_void_calls_leave_eax_alone() {
    let h = Harness::new();
    let mut process = root(&h);
    let mut trap = frame(&mut process, &[SyscallNumber::Close.code(), 7]);
    trap.eax = 0x1234;
    h.kernel.syscall(&mut process, &mut trap).unwrap();
    assert_eq!(trap.eax, 0x1234);
}

#[test]
fn test_console_write_from_frame() {
    let h = Harness::new();
    let mut process = root(&h);
    let buffer = PAGE + 0x900;
    process.memory_mut().write(buffer, b"hello").unwrap();

    let mut trap = frame(&mut process, &[SyscallNumber::Write.code(), 1, buffer, 5]);
    h.kernel.syscall(&mut process, &mut trap).unwrap();
    assert_eq!(trap.return_value(), 5);
    assert_eq!(h.output(), "hello");
}

#[test]
fn test_exit_through_frame_ends_the_process() {
    let h = Harness::new();
    let mut process = root(&h);
    let mut trap = frame(&mut process, &[SyscallNumber::Exit.code(), 42]);

    let exited = h.kernel.syscall(&mut process, &mut trap).unwrap_err();
    assert_eq!(exited.code, 42);
    assert_eq!(process.exit_code(), 42);
    assert!(process.is_terminated());

    // A dead process cannot trap again
    let mut trap = frame(&mut process, &[SyscallNumber::Close.code(), 2]);
    assert_eq!(h.kernel.syscall(&mut process, &mut trap).unwrap_err(), exited);
}

#[test]
fn test_frame_on_unmapped_stack_kills() {
    let h = Harness::new();
    let mut process = h.kernel.create_root_process("caller");
    let mut trap = TrapFrame::new(0x0804_8000);

    let exited = h.kernel.syscall(&mut process, &mut trap).unwrap_err();
    assert_eq!(exited.code, -1);
    assert_eq!(h.kernel.metrics().fatal_count(), 1);
}

#[test]
fn test_metrics_count_decoded_calls() {
    let h = Harness::new();
    let mut process = root(&h);
    for _ in 0..3 {
        let mut trap = frame(&mut process, &[SyscallNumber::Tell.code(), 2]);
        h.kernel.syscall(&mut process, &mut trap).unwrap();
    }
    let snapshot = h.kernel.metrics().snapshot();
    assert_eq!(snapshot.calls.get("tell"), Some(&3));
    assert_eq!(snapshot.total(), 3);
}
