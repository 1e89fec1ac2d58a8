/*!
 * Descriptor Table
 *
 * Per-process map from small integer descriptors to open file handles.
 * Descriptors 0 and 1 belong to the console and never live here; allocation
 * always hands out the smallest free value starting at 2.
 */

use crate::core::types::{Fd, FIRST_FILE_FD};
use crate::vfs::{FileHandle, FileSystem, VfsError};
use ahash::RandomState;
use std::collections::{BTreeSet, HashMap};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use thiserror::Error;
use tracing::debug;

/// Descriptor table errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Descriptor {0} is not open")]
    NotOpen(Fd),

    #[error("Descriptor table full ({limit} open files)")]
    TableFull { limit: usize },

    #[error("Open failed: {0}")]
    Open(#[from] VfsError),

    #[error("I/O error on descriptor {fd}: {message}")]
    Io { fd: Fd, message: String },
}

/// One descriptor-table entry
pub struct OpenFile {
    descriptor: Fd,
    name: String,
    handle: Box<dyn FileHandle>,
}

impl OpenFile {
    #[inline]
    pub fn descriptor(&self) -> Fd {
        self.descriptor
    }

    /// Name the file was opened under
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn handle(&mut self) -> &mut dyn FileHandle {
        self.handle.as_mut()
    }
}

impl std::fmt::Debug for OpenFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenFile")
            .field("descriptor", &self.descriptor)
            .field("name", &self.name)
            .finish()
    }
}

/// Per-process descriptor table
///
/// Freed descriptors go into an ordered free set; the smallest of those, or
/// the high-water mark when the set is empty, is the next allocation.
#[derive(Debug)]
pub struct DescriptorTable {
    entries: HashMap<Fd, OpenFile, RandomState>,
    free: BTreeSet<Fd>,
    next: Fd,
    limit: usize,
}

impl DescriptorTable {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: HashMap::with_hasher(RandomState::new()),
            free: BTreeSet::new(),
            next: FIRST_FILE_FD,
            limit,
        }
    }

    /// Open `name` and bind it to the smallest free descriptor
    ///
    /// Nothing is allocated when the file cannot be opened.
    pub fn open(&mut self, fs: &dyn FileSystem, name: &str) -> Result<Fd, DescriptorError> {
        if self.entries.len() >= self.limit {
            return Err(DescriptorError::TableFull { limit: self.limit });
        }
        let handle = fs.open(name)?;
        Ok(self.install(name, handle))
    }

    /// Bind an already-open handle to the smallest free descriptor
    fn install(&mut self, name: &str, handle: Box<dyn FileHandle>) -> Fd {
        let descriptor = self.allocate();
        self.entries.insert(
            descriptor,
            OpenFile {
                descriptor,
                name: name.to_string(),
                handle,
            },
        );
        debug!(fd = descriptor, name, "Descriptor allocated");
        descriptor
    }

    /// Release a descriptor; closing one that is not open does nothing
    pub fn close(&mut self, fd: Fd) -> bool {
        match self.entries.remove(&fd) {
            Some(file) => {
                self.release(fd);
                debug!(fd, name = %file.name, "Descriptor closed");
                true
            }
            None => false,
        }
    }

    /// Close every open descriptor, returning how many there were
    pub fn close_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.free.clear();
        self.next = FIRST_FILE_FD;
        count
    }

    #[inline]
    pub fn lookup(&mut self, fd: Fd) -> Option<&mut OpenFile> {
        self.entries.get_mut(&fd)
    }

    #[inline]
    pub fn is_open(&self, fd: Fd) -> bool {
        self.entries.contains_key(&fd)
    }

    /// Read up to `buf.len()` bytes from the current position
    pub fn read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize, DescriptorError> {
        let file = self.resolve(fd)?;
        let mut done = 0;
        while done < buf.len() {
            match file.handle.read(&mut buf[done..]) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_error(fd, e)),
            }
        }
        Ok(done)
    }

    /// Write `data` at the current position, returning the bytes actually written
    pub fn write(&mut self, fd: Fd, data: &[u8]) -> Result<usize, DescriptorError> {
        let file = self.resolve(fd)?;
        let mut done = 0;
        while done < data.len() {
            match file.handle.write(&data[done..]) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_error(fd, e)),
            }
        }
        Ok(done)
    }

    /// Move the position to `position` bytes from the start of the file
    pub fn seek(&mut self, fd: Fd, position: u64) -> Result<(), DescriptorError> {
        let file = self.resolve(fd)?;
        file.handle
            .seek(SeekFrom::Start(position))
            .map(|_| ())
            .map_err(|e| io_error(fd, e))
    }

    /// Position of the next byte to be read or written
    pub fn tell(&mut self, fd: Fd) -> Result<u64, DescriptorError> {
        let file = self.resolve(fd)?;
        file.handle.stream_position().map_err(|e| io_error(fd, e))
    }

    pub fn file_size(&mut self, fd: Fd) -> Result<u64, DescriptorError> {
        Ok(self.resolve(fd)?.handle.length())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open descriptors in ascending order
    pub fn descriptors(&self) -> Vec<Fd> {
        let mut fds: Vec<Fd> = self.entries.keys().copied().collect();
        fds.sort_unstable();
        fds
    }

    fn resolve(&mut self, fd: Fd) -> Result<&mut OpenFile, DescriptorError> {
        self.entries.get_mut(&fd).ok_or(DescriptorError::NotOpen(fd))
    }

    fn allocate(&mut self) -> Fd {
        match self.free.pop_first() {
            Some(fd) => fd,
            None => {
                let fd = self.next;
                self.next += 1;
                fd
            }
        }
    }

    fn release(&mut self, fd: Fd) {
        self.free.insert(fd);
        // Fold trailing free descriptors back into the high-water mark
        while self.next > FIRST_FILE_FD && self.free.remove(&(self.next - 1)) {
            self.next -= 1;
        }
    }
}

fn io_error(fd: Fd, err: std::io::Error) -> DescriptorError {
    DescriptorError::Io {
        fd,
        message: err.to_string(),
    }
}
