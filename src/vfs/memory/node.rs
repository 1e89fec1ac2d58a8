/*!
 * Filesystem Node Types
 * Internal representation of file contents
 */

use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// File contents shared by the directory entry and every open handle
///
/// Outlives removal from the directory for as long as a handle holds it.
#[derive(Debug)]
pub(in crate::vfs) struct Inode {
    pub data: RwLock<Vec<u8>>,
    usage: Arc<AtomicUsize>,
}

impl Inode {
    pub fn new(size: usize, usage: Arc<AtomicUsize>) -> Self {
        Self {
            data: RwLock::new(vec![0u8; size]),
            usage,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }
}

impl Drop for Inode {
    fn drop(&mut self) {
        // Space is returned when the last reference goes, not at remove
        self.usage.fetch_sub(self.data.get_mut().len(), Ordering::SeqCst);
    }
}
