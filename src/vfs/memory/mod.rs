/*!
 * In-Memory Filesystem Backend
 * Fast, volatile filesystem for testing and temporary storage
 */

mod file_handle;
mod node;

use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use super::traits::{FileHandle, FileSystem};
use super::types::*;
use crate::core::limits::NAME_MAX;
use file_handle::MemFile;
use node::Inode;

/// In-memory filesystem implementation
///
/// # Performance
/// - Cache-line aligned to prevent false sharing of atomic size counter (high-frequency file operations)
#[repr(C, align(64))]
#[derive(Debug, Clone)]
pub struct MemFs {
    nodes: Arc<DashMap<PathBuf, Arc<Inode>, RandomState>>,
    max_size: Option<usize>,
    current_size: Arc<AtomicUsize>,
    name_limit: usize,
}

impl MemFs {
    /// Create new in-memory filesystem
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(DashMap::with_hasher(RandomState::new())),
            max_size: None,
            current_size: Arc::new(AtomicUsize::new(0)),
            name_limit: NAME_MAX,
        }
    }

    /// Create with size limit
    pub fn with_capacity(max_size: usize) -> Self {
        let mut fs = Self::new();
        fs.max_size = Some(max_size);
        fs
    }

    /// Override the longest accepted file name
    #[must_use]
    pub fn with_name_limit(mut self, limit: usize) -> Self {
        self.name_limit = limit;
        self
    }

    /// Bytes currently held by file contents, including removed-but-open files
    pub fn used_bytes(&self) -> usize {
        self.current_size.load(Ordering::SeqCst)
    }

    /// Number of names in the directory
    pub fn file_count(&self) -> usize {
        self.nodes.len()
    }

    /// Copy host bytes into a new file, replacing any existing one
    pub fn put(&self, name: &str, contents: &[u8]) -> VfsResult<()> {
        let path = self.normalize(name)?;
        self.check_and_reserve_space(contents.len())?;
        let inode = Inode::new(contents.len(), Arc::clone(&self.current_size));
        inode.data.write().copy_from_slice(contents);
        self.nodes.insert(path, Arc::new(inode));
        Ok(())
    }

    /// Snapshot of a file's contents
    pub fn contents(&self, name: &str) -> VfsResult<Vec<u8>> {
        let path = self.normalize(name)?;
        self.nodes
            .get(&path)
            .map(|inode| inode.data.read().clone())
            .ok_or_else(|| VfsError::NotFound(name.to_string()))
    }

    /// Normalize name (make absolute and clean)
    fn normalize(&self, name: &str) -> VfsResult<PathBuf> {
        if name.is_empty() {
            return Err(VfsError::InvalidName(name.to_string()));
        }
        if name.len() > self.name_limit {
            return Err(VfsError::NameTooLong {
                name: name.to_string(),
                limit: self.name_limit,
            });
        }

        let path = Path::new("/").join(name);
        let cleaned = PathBuf::from(path_clean::clean(&path));
        if cleaned == Path::new("/") {
            return Err(VfsError::InvalidName(name.to_string()));
        }
        Ok(cleaned)
    }

    /// Check if space is available and reserve it atomically
    pub(super) fn check_and_reserve_space(&self, additional: usize) -> VfsResult<()> {
        match self.max_size {
            Some(max) => self
                .current_size
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                    current.checked_add(additional).filter(|&total| total <= max)
                })
                .map(|_| ())
                .map_err(|_| VfsError::OutOfSpace),
            None => {
                self.current_size.fetch_add(additional, Ordering::SeqCst);
                Ok(())
            }
        }
    }
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemFs {
    fn create(&self, name: &str, initial_size: u64) -> VfsResult<()> {
        let path = self.normalize(name)?;
        let size = usize::try_from(initial_size).map_err(|_| VfsError::OutOfSpace)?;

        match self.nodes.entry(path) {
            Entry::Occupied(_) => Err(VfsError::AlreadyExists(name.to_string())),
            Entry::Vacant(slot) => {
                self.check_and_reserve_space(size)?;
                slot.insert(Arc::new(Inode::new(size, Arc::clone(&self.current_size))));
                debug!(name, size, "File created");
                Ok(())
            }
        }
    }

    fn remove(&self, name: &str) -> VfsResult<()> {
        let path = self.normalize(name)?;
        self.nodes
            .remove(&path)
            .map(|_| debug!(name, "File removed"))
            .ok_or_else(|| VfsError::NotFound(name.to_string()))
    }

    fn open(&self, name: &str) -> VfsResult<Box<dyn FileHandle>> {
        let path = self.normalize(name)?;
        let inode = self
            .nodes
            .get(&path)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| VfsError::NotFound(name.to_string()))?;

        Ok(Box::new(MemFile {
            fs: self.clone(),
            inode,
            pos: 0,
        }))
    }

    fn exists(&self, name: &str) -> bool {
        self.normalize(name)
            .map(|path| self.nodes.contains_key(&path))
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "memfs"
    }
}
