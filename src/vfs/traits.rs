/*!
 * VFS Traits
 * File primitives the process layer consumes
 */

use std::io::{Read, Seek, Write};

use super::types::*;

/// Filesystem trait
///
/// Names are flat, per-filesystem identifiers. Every operation may fail;
/// callers turn failures into ordinary return values.
pub trait FileSystem: Send + Sync {
    /// Create a zero-filled file of `initial_size` bytes; fails if it exists
    fn create(&self, name: &str, initial_size: u64) -> VfsResult<()>;

    /// Remove a file; handles that are already open stay usable
    fn remove(&self, name: &str) -> VfsResult<()>;

    /// Open an existing file positioned at offset 0
    fn open(&self, name: &str) -> VfsResult<Box<dyn FileHandle>>;

    /// Check if file exists
    fn exists(&self, name: &str) -> bool;

    /// Get filesystem name/type
    fn name(&self) -> &str;
}

/// Open file handle trait
///
/// Represents an open file with read/write/seek capabilities.
/// Automatically closed when dropped.
pub trait FileHandle: Read + Write + Seek + Send {
    /// Current file length in bytes
    fn length(&self) -> u64;
}
