/*!
 * ID Generation
 * Process id allocation
 */

use super::types::Pid;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Monotonic process id allocator
///
/// Ids are never recycled: a parent may still hold a record for a child id
/// long after the child has gone, and a reused id would alias it.
#[derive(Debug, Clone)]
pub struct PidAllocator {
    counter: Arc<AtomicU32>,
}

impl PidAllocator {
    /// Create new allocator starting at given value
    #[inline]
    pub fn new(start: Pid) -> Self {
        Self {
            counter: Arc::new(AtomicU32::new(start)),
        }
    }

    /// Allocate the next id
    #[inline]
    pub fn next(&self) -> Pid {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Peek at the id the next call will return
    #[inline]
    pub fn current(&self) -> Pid {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for PidAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}
