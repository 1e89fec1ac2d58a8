/*!
 * Descriptor policy tests
 * Which descriptor misuses are fatal and which are tolerated
 */

use crate::common::{Harness, Recorder};
use pretty_assertions::assert_eq;
use userprog_kernel::core::KernelConfig;
use userprog_kernel::{BufferConsole, SyscallNumber};

fn killed_by(body: fn(&mut userprog_kernel::Userland<'_>) -> userprog_kernel::UserResult<i32>) {
    let h = Harness::new();
    let reached = Recorder::new();
    let r = reached.clone();
    h.program("victim", move |u| {
        body(u)?;
        r.push(true);
        Ok(0)
    });

    assert_eq!(h.run("victim"), -1);
    assert!(reached.values().is_empty(), "process kept running");
    assert_eq!(h.kernel.metrics().fatal_count(), 1);
}

#[test]
fn test_read_unknown_descriptor_is_fatal() {
    killed_by(|u| {
        let mut buf = [0u8; 4];
        u.read(7, &mut buf)
    });
}

#[test]
fn test_write_unknown_descriptor_is_fatal() {
    killed_by(|u| u.write(7, b"data"));
}

#[test]
fn test_filesize_unknown_descriptor_is_fatal() {
    killed_by(|u| u.filesize(5));
}

#[test]
fn test_read_from_console_output_is_fatal() {
    killed_by(|u| {
        let mut buf = [0u8; 1];
        u.read(1, &mut buf)
    });
}

#[test]
fn test_write_to_console_input_is_fatal() {
    killed_by(|u| u.write(0, b"x"));
}

#[test]
fn test_unknown_call_number_is_fatal() {
    killed_by(|u| u.syscall(99, &[]).map(|eax| eax as i32));
}

#[test]
fn test_unmapped_pointer_is_fatal() {
    killed_by(|u| {
        u.syscall(SyscallNumber::Open.code(), &[0x0804_8000])
            .map(|eax| eax as i32)
    });
}

#[test]
fn test_kernel_pointer_is_fatal() {
    killed_by(|u| {
        u.syscall(SyscallNumber::Write.code(), &[1, 0xC000_0000, 4])
            .map(|eax| eax as i32)
    });
}

#[test]
fn test_seek_tell_close_tolerate_unknown_descriptors() {
    let h = Harness::new();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("lenient", move |u| {
        u.seek(9, 100)?;
        s.push(u.tell(9)? as i32);
        u.close(9)?;
        u.close(0)?;
        u.close(1)?;
        s.push(1);
        Ok(0)
    });

    assert_eq!(h.run("lenient"), 0);
    assert_eq!(seen.values(), vec![0, 1]);
    assert_eq!(h.kernel.metrics().fatal_count(), 0);
}

#[test]
fn test_double_close_is_noop() {
    let h = Harness::new();
    h.fs.put("a", b"abc").unwrap();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("closer", move |u| {
        let fd = u.open("a")?;
        u.close(fd)?;
        u.close(fd)?;
        s.push(u.open("a")?);
        Ok(0)
    });

    assert_eq!(h.run("closer"), 0);
    assert_eq!(seen.values(), vec![2]);
}

#[test]
fn test_smallest_free_descriptor_is_reused() {
    let h = Harness::new();
    h.fs.put("a", b"").unwrap();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("alloc", move |u| {
        for _ in 0..3 {
            s.push(u.open("a")?);
        }
        u.close(3)?;
        s.push(u.open("a")?);
        s.push(u.open("a")?);
        Ok(0)
    });

    assert_eq!(h.run("alloc"), 0);
    assert_eq!(seen.values(), vec![2, 3, 4, 3, 5]);
}

#[test]
fn test_open_fails_at_descriptor_limit() {
    let config = KernelConfig::default()
        .with_announce_exits(false)
        .with_max_open_files(2);
    let h = Harness::with_config(config);
    h.fs.put("a", b"").unwrap();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("greedy", move |u| {
        for _ in 0..3 {
            s.push(u.open("a")?);
        }
        Ok(0)
    });

    assert_eq!(h.run("greedy"), 0);
    assert_eq!(seen.values(), vec![2, 3, -1]);
}

#[test]
fn test_seek_tell_and_filesize() {
    let h = Harness::new();
    h.fs.put("data", b"0123456789").unwrap();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("seeker", move |u| {
        let fd = u.open("data")?;
        s.push(u.filesize(fd)?);
        u.seek(fd, 6)?;
        s.push(u.tell(fd)? as i32);
        let mut buf = [0u8; 8];
        s.push(u.read(fd, &mut buf)?);
        s.push(u.tell(fd)? as i32);
        Ok(0)
    });

    assert_eq!(h.run("seeker"), 0);
    assert_eq!(seen.values(), vec![10, 6, 4, 10]);
}

#[test]
fn test_read_from_console_input() {
    let console = BufferConsole::with_input(b"abc");
    let h = Harness::with_console(KernelConfig::default().with_announce_exits(false), console);
    let data = Recorder::new();
    let d = data.clone();
    h.program("reader", move |u| {
        let mut buf = [0u8; 3];
        let n = u.read(0, &mut buf)?;
        d.push(buf[..n as usize].to_vec());
        Ok(0)
    });

    assert_eq!(h.run("reader"), 0);
    assert_eq!(data.values(), vec![b"abc".to_vec()]);
}

#[test]
fn test_console_writes_are_chunked() {
    let config = KernelConfig::default()
        .with_announce_exits(false)
        .with_console_chunk(4);
    let h = Harness::with_config(config);
    h.program("chatty", |u| {
        u.write(1, b"0123456789")?;
        Ok(0)
    });

    assert_eq!(h.run("chatty"), 0);
    assert_eq!(h.output(), "0123456789");
    assert_eq!(h.console.write_calls(), 3);
}

#[test]
fn test_create_and_remove_report_flags() {
    let h = Harness::new();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("names", move |u| {
        s.push(u.create("note", 16)?);
        s.push(u.create("note", 16)?);
        s.push(u.create("a-name-far-too-long", 0)?);
        s.push(u.create("", 0)?);
        s.push(u.remove("note")?);
        s.push(u.remove("note")?);
        Ok(0)
    });

    assert_eq!(h.run("names"), 0);
    assert_eq!(seen.values(), vec![true, false, false, false, true, false]);
}

#[test]
fn test_open_file_survives_remove() {
    let h = Harness::new();
    h.fs.put("doomed", b"still here").unwrap();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("keeper", move |u| {
        let fd = u.open("doomed")?;
        u.remove("doomed")?;
        s.push(u.open("doomed")?);
        let mut buf = [0u8; 10];
        s.push(u.read(fd, &mut buf)?);
        Ok(0)
    });

    assert_eq!(h.run("keeper"), 0);
    assert_eq!(seen.values(), vec![-1, 10]);
}
