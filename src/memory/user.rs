/*!
 * User Address Space
 *
 * Sparse, page-granular memory below `PHYS_BASE`. Pages exist only once
 * mapped; touching anything else is a fault.
 */

use super::types::{MemoryError, MemoryResult};
use crate::core::limits::{PGSIZE, PHYS_BASE, WORD_SIZE};
use crate::core::types::UserAddr;
use std::collections::BTreeMap;

type Page = Box<[u8; PGSIZE]>;

/// Page number containing `addr`
#[inline]
const fn page_number(addr: UserAddr) -> u32 {
    addr / PGSIZE as u32
}

/// Round `addr` down to its page boundary
#[inline]
pub const fn page_round_down(addr: UserAddr) -> UserAddr {
    addr & !(PGSIZE as u32 - 1)
}

/// One process's user address space
#[derive(Default)]
pub struct UserMemory {
    pages: BTreeMap<u32, Page>,
}

impl UserMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every page overlapping `[addr, addr + len)`, zero-filled
    pub fn map_range(&mut self, addr: UserAddr, len: usize) -> MemoryResult<()> {
        if len == 0 {
            return Ok(());
        }
        let last = Self::last_byte(addr, len)?;
        for page in page_number(addr)..=page_number(last) {
            self.pages
                .entry(page)
                .or_insert_with(|| Box::new([0u8; PGSIZE]));
        }
        Ok(())
    }

    /// Unmap every page overlapping `[addr, addr + len)`
    pub fn unmap_range(&mut self, addr: UserAddr, len: usize) {
        if len == 0 {
            return;
        }
        if let Ok(last) = Self::last_byte(addr, len) {
            for page in page_number(addr)..=page_number(last) {
                self.pages.remove(&page);
            }
        }
    }

    #[inline]
    pub fn is_mapped(&self, addr: UserAddr) -> bool {
        addr < PHYS_BASE && self.pages.contains_key(&page_number(addr))
    }

    #[inline]
    pub fn mapped_pages(&self) -> usize {
        self.pages.len()
    }

    /// Copy `buf.len()` bytes starting at `addr` into `buf`
    pub fn read(&self, addr: UserAddr, buf: &mut [u8]) -> MemoryResult<()> {
        if buf.is_empty() {
            return Ok(());
        }
        Self::last_byte(addr, buf.len())?;
        let mut done = 0;
        while done < buf.len() {
            let at = addr + done as u32;
            let page = self.page(at)?;
            let offset = (at as usize) % PGSIZE;
            let n = (PGSIZE - offset).min(buf.len() - done);
            buf[done..done + n].copy_from_slice(&page[offset..offset + n]);
            done += n;
        }
        Ok(())
    }

    /// Copy `data` into user memory starting at `addr`
    pub fn write(&mut self, addr: UserAddr, data: &[u8]) -> MemoryResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        // Fault before writing anything so a failed copy leaves memory untouched
        self.check_mapped(addr, data.len())?;

        let mut done = 0;
        while done < data.len() {
            let at = addr + done as u32;
            let offset = (at as usize) % PGSIZE;
            let n = (PGSIZE - offset).min(data.len() - done);
            let page = self.page_mut(at)?;
            page[offset..offset + n].copy_from_slice(&data[done..done + n]);
            done += n;
        }
        Ok(())
    }

    pub fn read_bytes(&self, addr: UserAddr, len: usize) -> MemoryResult<Vec<u8>> {
        self.check_mapped(addr, len)?;
        let mut buf = vec![0u8; len];
        self.read(addr, &mut buf)?;
        Ok(buf)
    }

    /// Read one little-endian word
    pub fn read_u32(&self, addr: UserAddr) -> MemoryResult<u32> {
        let mut word = [0u8; WORD_SIZE as usize];
        self.read(addr, &mut word)?;
        Ok(u32::from_le_bytes(word))
    }

    /// Write one little-endian word
    pub fn write_u32(&mut self, addr: UserAddr, value: u32) -> MemoryResult<()> {
        self.write(addr, &value.to_le_bytes())
    }

    /// Read a NUL-terminated string of at most `limit` bytes (excluding NUL)
    ///
    /// Invalid UTF-8 is replaced rather than rejected; names are compared
    /// byte-for-byte by the filesystem anyway.
    pub fn read_cstr(&self, addr: UserAddr, limit: usize) -> MemoryResult<String> {
        let mut bytes = Vec::new();
        let mut at = addr;
        loop {
            let page = self.page(at)?;
            let offset = (at as usize) % PGSIZE;
            match page[offset..].iter().position(|&b| b == 0) {
                Some(end) => {
                    bytes.extend_from_slice(&page[offset..offset + end]);
                    break;
                }
                None => {
                    bytes.extend_from_slice(&page[offset..]);
                    at = at
                        .checked_add((PGSIZE - offset) as u32)
                        .ok_or(MemoryError::PageFault { addr: u32::MAX })?;
                }
            }
            if bytes.len() > limit {
                break;
            }
        }
        if bytes.len() > limit {
            return Err(MemoryError::StringTooLong { addr, limit });
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Fault unless every page of `[addr, addr + len)` is mapped
    pub fn check_mapped(&self, addr: UserAddr, len: usize) -> MemoryResult<()> {
        if len == 0 {
            return Ok(());
        }
        let last = Self::last_byte(addr, len)?;
        for page in page_number(addr)..=page_number(last) {
            if !self.pages.contains_key(&page) {
                return Err(MemoryError::PageFault {
                    addr: (page * PGSIZE as u32).max(addr),
                });
            }
        }
        Ok(())
    }

    fn page(&self, addr: UserAddr) -> MemoryResult<&Page> {
        if addr >= PHYS_BASE {
            return Err(MemoryError::KernelAddress { addr });
        }
        self.pages
            .get(&page_number(addr))
            .ok_or(MemoryError::PageFault { addr })
    }

    fn page_mut(&mut self, addr: UserAddr) -> MemoryResult<&mut Page> {
        if addr >= PHYS_BASE {
            return Err(MemoryError::KernelAddress { addr });
        }
        self.pages
            .get_mut(&page_number(addr))
            .ok_or(MemoryError::PageFault { addr })
    }

    /// Address of the last byte of `[addr, addr + len)`, if the whole range is user space
    fn last_byte(addr: UserAddr, len: usize) -> MemoryResult<UserAddr> {
        let last = u32::try_from(len - 1)
            .ok()
            .and_then(|n| addr.checked_add(n))
            .ok_or(MemoryError::KernelAddress { addr })?;
        if last >= PHYS_BASE {
            return Err(MemoryError::KernelAddress {
                addr: addr.max(PHYS_BASE),
            });
        }
        Ok(last)
    }
}

impl std::fmt::Debug for UserMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserMemory")
            .field("mapped_pages", &self.pages.len())
            .finish()
    }
}
