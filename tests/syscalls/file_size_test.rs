/*!
 * File size tests
 * Large lengths and positions, and the filesystem capacity cap
 */

use crate::common::{Harness, Recorder};
use pretty_assertions::assert_eq;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use userprog_kernel::core::limits::DEFAULT_MAX_FS_BYTES;
use userprog_kernel::core::KernelConfig;
use userprog_kernel::vfs::{FileHandle, FileSystem, VfsError, VfsResult};
use userprog_kernel::{Kernel, ProgramTable};

const HUGE_LEN: u64 = 3 << 30;

/// One file that claims to be 3 GiB long and stores nothing
struct SparseFs;

struct SparseFile {
    pos: u64,
}

impl Read for SparseFile {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        Ok(0)
    }
}

impl Write for SparseFile {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Ok(0)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Seek for SparseFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        if let SeekFrom::Start(offset) = pos {
            self.pos = offset;
        }
        Ok(self.pos)
    }
}

impl FileHandle for SparseFile {
    fn length(&self) -> u64 {
        HUGE_LEN
    }
}

impl FileSystem for SparseFs {
    fn create(&self, _name: &str, _initial_size: u64) -> VfsResult<()> {
        Err(VfsError::OutOfSpace)
    }

    fn remove(&self, name: &str) -> VfsResult<()> {
        Err(VfsError::NotFound(name.to_string()))
    }

    fn open(&self, name: &str) -> VfsResult<Box<dyn FileHandle>> {
        match name {
            "huge" => Ok(Box::new(SparseFile { pos: 0 })),
            _ => Err(VfsError::NotFound(name.to_string())),
        }
    }

    fn exists(&self, name: &str) -> bool {
        name == "huge"
    }

    fn name(&self) -> &str {
        "sparse"
    }
}

#[test]
fn test_filesize_of_huge_file_is_not_the_failure_value() {
    let programs = ProgramTable::new();
    let kernel = Kernel::builder()
        .with_config(KernelConfig::default().with_announce_exits(false))
        .with_filesystem(Arc::new(SparseFs))
        .with_loader(Arc::new(programs.clone()))
        .build();

    let seen = Recorder::new();
    let s = seen.clone();
    programs.register("sizer", move |u| {
        let fd = u.open("huge")?;
        s.push(i64::from(fd));
        s.push(i64::from(u.filesize(fd)?));
        u.seek(fd, 0x9000_0000)?;
        s.push(i64::from(u.tell(fd)?));
        Ok(0)
    });

    assert_eq!(kernel.run_task("sizer").unwrap(), 0);
    assert_eq!(
        seen.values(),
        vec![2, i64::from(i32::MAX), 0x9000_0000]
    );
}

#[test]
fn test_create_beyond_capacity_fails() {
    let h = Harness::new();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("hog", move |u| {
        s.push(u.create("big", u32::MAX)?);
        s.push(u.create("small", 16)?);
        Ok(0)
    });

    assert_eq!(h.run("hog"), 0);
    assert_eq!(seen.values(), vec![false, true]);
    assert_eq!(h.fs.used_bytes(), 16);
}

#[test]
fn test_write_far_past_end_writes_nothing() {
    let h = Harness::new();
    h.fs.put("log", b"abc").unwrap();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("sparse", move |u| {
        let fd = u.open("log")?;
        u.seek(fd, u32::MAX)?;
        s.push(u.write(fd, b"x")?);
        s.push(u.filesize(fd)?);
        u.seek(fd, 3)?;
        s.push(u.write(fd, b"de")?);
        s.push(u.filesize(fd)?);
        Ok(0)
    });

    assert_eq!(h.run("sparse"), 0);
    assert_eq!(seen.values(), vec![0, 3, 2, 5]);
    assert_eq!(h.fs.contents("log").unwrap(), b"abcde");
    assert_eq!(h.fs.used_bytes(), 5);
}

#[test]
fn test_configured_capacity_bounds_growth() {
    let config = KernelConfig::default()
        .with_announce_exits(false)
        .with_max_fs_bytes(8);
    let h = Harness::with_config(config);
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("filler", move |u| {
        s.push(i32::from(u.create("a", 4)?));
        s.push(i32::from(u.create("b", 5)?));
        let fd = u.open("a")?;
        u.seek(fd, 2)?;
        s.push(u.write(fd, b"0123456789")?);
        Ok(0)
    });

    assert_eq!(h.run("filler"), 0);
    // Growth past the cap is refused, so the write stops at the old length
    assert_eq!(seen.values(), vec![1, 0, 2]);
    assert_eq!(h.fs.used_bytes(), 4);
}

#[test]
fn test_default_filesystem_is_capped() {
    let programs = ProgramTable::new();
    let kernel = Kernel::builder()
        .with_config(KernelConfig::default().with_announce_exits(false))
        .with_loader(Arc::new(programs.clone()))
        .build();
    assert_eq!(kernel.config().max_fs_bytes, DEFAULT_MAX_FS_BYTES);

    let seen = Recorder::new();
    let s = seen.clone();
    programs.register("hog", move |u| {
        s.push(u.create("big", u32::MAX)?);
        s.push(u.create("fits", 1024)?);
        Ok(0)
    });

    assert_eq!(kernel.run_task("hog").unwrap(), 0);
    assert_eq!(seen.values(), vec![false, true]);
}
