/*!
 * File Handle Implementation
 * In-memory file handle for read/write operations
 */

use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use super::super::traits::FileHandle;
use super::node::Inode;
use super::MemFs;

/// In-memory file handle
pub(super) struct MemFile {
    pub fs: MemFs,
    pub inode: Arc<Inode>,
    pub pos: u64,
}

impl Read for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let data = self.inode.data.read();
        let start = (self.pos as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemFile {
    /// Writes past end of file extend it while space lasts; the return value
    /// is the number of bytes actually written, which may be short.
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut data = self.inode.data.write();
        let start = self.pos as usize;
        let wanted_end = start.saturating_add(buf.len());

        let end = if wanted_end > data.len() {
            let growth = wanted_end - data.len();
            if self.fs.check_and_reserve_space(growth).is_ok() {
                data.resize(wanted_end, 0);
                wanted_end
            } else {
                data.len()
            }
        } else {
            wanted_end
        };

        if start >= end {
            return Ok(0);
        }
        let n = end - start;
        data[start..end].copy_from_slice(&buf[..n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Seek for MemFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => (self.inode.len() as u64).checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        match target {
            Some(position) => {
                self.pos = position;
                Ok(position)
            }
            None => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seek to a negative offset",
            )),
        }
    }
}

impl FileHandle for MemFile {
    fn length(&self) -> u64 {
        self.inode.len() as u64
    }
}
