/*!
 * Child Registry
 *
 * A parent's records of the children it spawned, keyed by child id.
 * Private to the parent; the only state shared with a child is the exit
 * rendezvous inside each record.
 */

use super::rendezvous::{exit_rendezvous, ExitNotifier, ExitWatch};
use super::types::WaitError;
use crate::core::types::{ExitCode, Pid};
use std::collections::BTreeMap;

/// Parent's view of one spawned child
#[derive(Debug)]
pub struct ChildRecord {
    child_id: Pid,
    exit: ExitWatch,
    already_waited: bool,
}

impl ChildRecord {
    #[inline]
    pub fn child_id(&self) -> Pid {
        self.child_id
    }

    /// Exit code, once the child has terminated
    #[inline]
    pub fn exit_code(&self) -> Option<ExitCode> {
        self.exit.status()
    }

    #[inline]
    pub fn already_waited(&self) -> bool {
        self.already_waited
    }
}

/// Ordered collection of a process's child records
#[derive(Debug, Default)]
pub struct ChildRegistry {
    children: BTreeMap<Pid, ChildRecord>,
}

impl ChildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the record for a child that is about to start
    ///
    /// Must happen before the child can run, so an early exit always finds
    /// a record to update. The returned notifier belongs to the child.
    pub fn register(&mut self, child_id: Pid) -> ExitNotifier {
        let (notifier, exit) = exit_rendezvous();
        self.children.insert(
            child_id,
            ChildRecord {
                child_id,
                exit,
                already_waited: false,
            },
        );
        notifier
    }

    /// Drop the record of a child that never started
    pub fn discard(&mut self, child_id: Pid) -> Option<ChildRecord> {
        self.children.remove(&child_id)
    }

    /// Mark a child as waited for and hand back its exit watch
    ///
    /// Succeeds at most once per child.
    pub fn claim(&mut self, child_id: Pid) -> Result<ExitWatch, WaitError> {
        let record = self
            .children
            .get_mut(&child_id)
            .ok_or(WaitError::NotChild(child_id))?;
        if record.already_waited {
            return Err(WaitError::AlreadyWaited(child_id));
        }
        record.already_waited = true;
        Ok(record.exit.clone())
    }

    #[inline]
    pub fn get(&self, child_id: Pid) -> Option<&ChildRecord> {
        self.children.get(&child_id)
    }

    #[inline]
    pub fn contains(&self, child_id: Pid) -> bool {
        self.children.contains_key(&child_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children that terminated but were never waited for
    pub fn unconsumed(&self) -> impl Iterator<Item = &ChildRecord> {
        self.children
            .values()
            .filter(|record| !record.already_waited && record.exit.is_signaled())
    }

    /// Discard every record; children still running become orphans
    pub fn release_all(&mut self) -> usize {
        let count = self.children.len();
        self.children.clear();
        count
    }
}
