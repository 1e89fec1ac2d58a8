/*!
 * Exit Rendezvous
 *
 * One-shot hand-off of an exit code from a child to its parent.
 *
 * The parent's child record owns the shared cell through an [`ExitWatch`];
 * the child holds only a weak [`ExitNotifier`]. Notifying consumes the
 * notifier, so a child can signal at most once, and dropping an unused
 * notifier signals failure, so a waiter is never stranded. When the parent
 * has already discarded the record, notifying is a silent no-op.
 */

use crate::core::types::{ExitCode, EXIT_FAILURE};
use parking_lot::{Condvar, Mutex};
use std::sync::{Arc, Weak};

#[derive(Debug, Default)]
struct ExitCell {
    status: Mutex<Option<ExitCode>>,
    signaled: Condvar,
}

/// Create a connected notifier/watch pair
pub fn exit_rendezvous() -> (ExitNotifier, ExitWatch) {
    let cell = Arc::new(ExitCell::default());
    let notifier = ExitNotifier {
        cell: Some(Arc::downgrade(&cell)),
    };
    (notifier, ExitWatch { cell })
}

/// Parent-side view of a child's exit code
#[derive(Debug, Clone)]
pub struct ExitWatch {
    cell: Arc<ExitCell>,
}

impl ExitWatch {
    /// Block until the child signals, then return its exit code
    pub fn wait(&self) -> ExitCode {
        let mut status = self.cell.status.lock();
        loop {
            if let Some(code) = *status {
                return code;
            }
            self.cell.signaled.wait(&mut status);
        }
    }

    /// Exit code if already signaled
    #[inline]
    pub fn status(&self) -> Option<ExitCode> {
        *self.cell.status.lock()
    }

    #[inline]
    pub fn is_signaled(&self) -> bool {
        self.status().is_some()
    }
}

/// Child-side, single-use signal
#[derive(Debug)]
pub struct ExitNotifier {
    cell: Option<Weak<ExitCell>>,
}

impl ExitNotifier {
    /// Publish the exit code and wake the waiter
    ///
    /// Returns whether anyone could still observe it.
    pub fn notify(mut self, code: ExitCode) -> bool {
        self.deliver(code)
    }

    /// Whether the parent still holds the record
    pub fn is_observed(&self) -> bool {
        self.cell
            .as_ref()
            .is_some_and(|cell| cell.strong_count() > 0)
    }

    fn deliver(&mut self, code: ExitCode) -> bool {
        let Some(cell) = self.cell.take().and_then(|weak| weak.upgrade()) else {
            return false;
        };
        let mut status = cell.status.lock();
        debug_assert!(status.is_none(), "exit rendezvous signaled twice");
        *status = Some(code);
        cell.signaled.notify_all();
        true
    }
}

impl Drop for ExitNotifier {
    fn drop(&mut self) {
        if self.cell.is_some() {
            self.deliver(EXIT_FAILURE);
        }
    }
}
