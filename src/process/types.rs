/*!
 * Process Types
 * Common types for process management
 */

use crate::core::types::{ExitCode, Pid};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Process errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
pub enum ProcessError {
    #[error("Invalid command line: {0}")]
    InvalidCommand(String),

    #[error("Load failed for {program}: {reason}")]
    LoadFailed { program: String, reason: String },

    #[error("Spawn failed: {0}")]
    SpawnFailed(String),
}

/// Why a program image could not be started
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
pub enum LoadError {
    #[error("No such program: {0}")]
    NotFound(String),

    #[error("Arguments do not fit on the initial stack ({needed} bytes)")]
    ArgumentsTooLarge { needed: usize },

    #[error("Stack setup faulted: {0}")]
    StackFault(String),
}

/// Why a `wait` call was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
pub enum WaitError {
    #[error("Process {0} is not a child of the caller")]
    NotChild(Pid),

    #[error("Process {0} has already been waited for")]
    AlreadyWaited(Pid),
}

/// Lifecycle state of a process, as seen in the process table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Record exists, program not yet loaded
    Starting,
    /// Program image loaded and executing
    Running,
    /// Blocked in `wait`
    Waiting,
}

/// Process metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    pub parent: Option<Pid>,
    pub name: String,
    pub state: ProcessState,
}

impl ProcessInfo {
    pub fn new(pid: Pid, parent: Option<Pid>, name: impl Into<String>) -> Self {
        Self {
            pid,
            parent,
            name: name.into(),
            state: ProcessState::Starting,
        }
    }
}

/// Proof that a process has terminated
///
/// Returned instead of a value by every call that ends the calling process.
/// User code propagates it with `?`; nothing can resume a process that
/// produced one.
#[must_use = "a terminated process must stop executing"]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("process {pid} exited with status {code}")]
pub struct Exited {
    pub pid: Pid,
    pub code: ExitCode,
}
