/*!
 * Process Control Block
 *
 * Everything one process owns. A `Process` is held by the thread that runs
 * it and handed by `&mut` to the dispatcher on every trap, so none of this
 * needs locking.
 */

use super::descriptors::DescriptorTable;
use super::registry::ChildRegistry;
use super::rendezvous::ExitNotifier;
use super::types::Exited;
use crate::core::types::{ExitCode, Pid, UserAddr, EXIT_FAILURE};
use crate::memory::UserMemory;

/// A child's link back to the parent that spawned it
///
/// Holds no reference to the parent itself, only the weak end of the
/// record the parent keeps for this child.
#[derive(Debug)]
pub struct ParentLink {
    pid: Pid,
    notifier: ExitNotifier,
}

impl ParentLink {
    pub fn new(pid: Pid, notifier: ExitNotifier) -> Self {
        Self { pid, notifier }
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Deliver the exit code; false when the parent is gone
    pub fn deliver(self, code: ExitCode) -> bool {
        self.notifier.notify(code)
    }
}

/// Per-process state
#[derive(Debug)]
pub struct Process {
    id: Pid,
    name: String,
    is_user: bool,
    parent: Option<ParentLink>,
    pub(crate) children: ChildRegistry,
    pub(crate) descriptors: DescriptorTable,
    pub(crate) memory: UserMemory,
    pub(crate) entry_esp: UserAddr,
    exit_code: ExitCode,
    terminated: Option<Exited>,
}

impl Process {
    pub(crate) fn new(
        id: Pid,
        name: impl Into<String>,
        parent: Option<ParentLink>,
        max_open_files: usize,
        is_user: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            is_user,
            parent,
            children: ChildRegistry::new(),
            descriptors: DescriptorTable::new(max_open_files),
            memory: UserMemory::new(),
            entry_esp: 0,
            exit_code: EXIT_FAILURE,
            terminated: None,
        }
    }

    #[inline]
    pub fn id(&self) -> Pid {
        self.id
    }

    /// Program name, the first word of the command line
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this process runs a user program (and announces its exit)
    #[inline]
    pub fn is_user(&self) -> bool {
        self.is_user
    }

    /// Parent id while the link is still held
    #[inline]
    pub fn parent_id(&self) -> Option<Pid> {
        self.parent.as_ref().map(ParentLink::pid)
    }

    #[inline]
    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.terminated.is_some()
    }

    /// Termination token, once the process has exited
    #[inline]
    pub fn exited(&self) -> Option<Exited> {
        self.terminated
    }

    #[inline]
    pub fn children(&self) -> &ChildRegistry {
        &self.children
    }

    #[inline]
    pub fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    #[inline]
    pub fn memory(&self) -> &UserMemory {
        &self.memory
    }

    #[inline]
    pub fn memory_mut(&mut self) -> &mut UserMemory {
        &mut self.memory
    }

    pub(crate) fn set_exit_code(&mut self, code: ExitCode) {
        self.exit_code = code;
    }

    pub(crate) fn take_parent(&mut self) -> Option<ParentLink> {
        self.parent.take()
    }

    pub(crate) fn mark_terminated(&mut self) -> Exited {
        let exited = Exited {
            pid: self.id,
            code: self.exit_code,
        };
        self.terminated = Some(exited);
        exited
    }
}
