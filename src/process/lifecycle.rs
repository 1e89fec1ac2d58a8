/*!
 * Process Lifecycle
 *
 * Spawn, wait and termination, plus the kernel handle that ties the
 * process layer to its collaborators.
 *
 * # Ordering
 *
 * - `spawn` registers the child record before the child thread exists and
 *   does not return until the child reports whether its program loaded.
 * - `terminate` closes every descriptor and drops the child records before
 *   the exit code is handed to the parent, then marks the process dead.
 *   It is idempotent: a second call returns the first token.
 */

use super::builder::KernelBuilder;
use super::control::{ParentLink, Process};
use super::loader::ProgramLoader;
use super::stack::{setup_stack, CommandLine};
use super::types::{Exited, LoadError, ProcessError, ProcessInfo, ProcessResult, ProcessState, WaitError};
use crate::core::config::KernelConfig;
use crate::core::id::PidAllocator;
use crate::core::types::{ExitCode, Pid, EXIT_FAILURE};
use crate::devices::{Console, PowerControl};
use crate::monitoring::SyscallMetrics;
use crate::syscalls::{SyscallDispatcher, TrapFrame};
use crate::userland::Userland;
use crate::vfs::FileSystem;
use ahash::RandomState;
use dashmap::DashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, info_span, warn};

pub(super) struct KernelInner {
    pub(super) config: KernelConfig,
    pub(super) fs: Arc<dyn FileSystem>,
    pub(super) console: Arc<dyn Console>,
    pub(super) loader: Arc<dyn ProgramLoader>,
    pub(super) power: Arc<dyn PowerControl>,
    pub(super) pids: PidAllocator,
    pub(super) table: DashMap<Pid, ProcessInfo, RandomState>,
    pub(super) metrics: SyscallMetrics,
    pub(super) dispatcher: SyscallDispatcher,
}

/// Handle to the process layer
///
/// Cheap to clone; every process thread carries one.
#[derive(Clone)]
pub struct Kernel {
    inner: Arc<KernelInner>,
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("config", &self.inner.config)
            .field("processes", &self.inner.table.len())
            .field("powered_off", &self.is_powered_off())
            .finish()
    }
}

impl Kernel {
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    pub(super) fn from_inner(inner: KernelInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    #[inline]
    pub fn config(&self) -> &KernelConfig {
        &self.inner.config
    }

    #[inline]
    pub fn filesystem(&self) -> &dyn FileSystem {
        self.inner.fs.as_ref()
    }

    #[inline]
    pub fn console(&self) -> &dyn Console {
        self.inner.console.as_ref()
    }

    #[inline]
    pub fn metrics(&self) -> &SyscallMetrics {
        &self.inner.metrics
    }

    #[inline]
    pub fn is_powered_off(&self) -> bool {
        self.inner.power.is_off()
    }

    /// Live processes, ordered by id
    pub fn processes(&self) -> Vec<ProcessInfo> {
        let mut processes: Vec<ProcessInfo> = self
            .inner
            .table
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        processes.sort_by_key(|info| info.pid);
        processes
    }

    /// Create a kernel-side process with no parent
    ///
    /// Root processes may spawn and wait like any other, but never announce
    /// their exit.
    pub fn create_root_process(&self, name: &str) -> Process {
        let pid = self.inner.pids.next();
        let mut info = ProcessInfo::new(pid, None, name);
        info.state = ProcessState::Running;
        self.inner.table.insert(pid, info);
        debug!(pid, name, "Root process created");
        Process::new(pid, name, None, self.inner.config.max_open_files, false)
    }

    /// User-side view of `process`, for code running on its thread
    pub fn userland<'a>(&'a self, process: &'a mut Process) -> Userland<'a> {
        Userland::new(self, process)
    }

    /// Run `command_line` as a child of a fresh root process and wait for it
    pub fn run_task(&self, command_line: &str) -> ProcessResult<ExitCode> {
        let mut root = self.create_root_process("main");
        let result = self
            .spawn(&mut root, command_line)
            .map(|pid| self.wait(&mut root, pid).unwrap_or(EXIT_FAILURE));
        let code = *result.as_ref().unwrap_or(&EXIT_FAILURE);
        let _ = self.terminate(&mut root, code);
        result
    }

    /// Start `command_line` as a child of `parent`
    ///
    /// Returns only after the child has either loaded its program or
    /// failed to; on failure the child record is gone again.
    pub fn spawn(&self, parent: &mut Process, command_line: &str) -> ProcessResult<Pid> {
        let config = &self.inner.config;
        let command =
            CommandLine::parse(command_line, config.max_command_line, config.max_args)?;
        let program = command.program().to_string();

        let pid = self.inner.pids.next();
        let notifier = parent.children.register(pid);
        let child = Process::new(
            pid,
            program.as_str(),
            Some(ParentLink::new(parent.id(), notifier)),
            config.max_open_files,
            true,
        );
        self.inner
            .table
            .insert(pid, ProcessInfo::new(pid, Some(parent.id()), program.as_str()));

        let (ready_tx, ready_rx) = flume::bounded::<Result<(), LoadError>>(1);
        let kernel = self.clone();
        let argv = command.argv().to_vec();
        let spawned = thread::Builder::new()
            .name(format!("{program}#{pid}"))
            .spawn(move || kernel.run_process(child, argv, ready_tx));

        if let Err(err) = spawned {
            self.abandon(parent, pid);
            return Err(ProcessError::SpawnFailed(err.to_string()));
        }

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!(parent = parent.id(), pid, program = %program, "Process spawned");
                Ok(pid)
            }
            Ok(Err(err)) => {
                self.abandon(parent, pid);
                debug!(pid, program = %program, error = %err, "Load failed");
                Err(ProcessError::LoadFailed {
                    program,
                    reason: err.to_string(),
                })
            }
            Err(_) => {
                self.abandon(parent, pid);
                Err(ProcessError::LoadFailed {
                    program,
                    reason: "process exited before reporting load status".into(),
                })
            }
        }
    }

    /// Block until child `pid` exits and return its code, at most once
    pub fn wait(&self, process: &mut Process, pid: Pid) -> Result<ExitCode, WaitError> {
        let exit = process.children.claim(pid)?;
        self.set_state(process.id(), ProcessState::Waiting);
        let code = exit.wait();
        self.set_state(process.id(), ProcessState::Running);
        debug!(pid = process.id(), child = pid, code, "Child reaped");
        Ok(code)
    }

    /// End `process` with `code`
    pub fn terminate(&self, process: &mut Process, code: ExitCode) -> Exited {
        self.finish(process, code, true)
    }

    /// Process-exit entry point for faults and fatal protocol violations
    pub fn fault(&self, process: &mut Process, reason: impl fmt::Display) -> Exited {
        if let Some(exited) = process.exited() {
            return exited;
        }
        warn!(pid = process.id(), program = %process.name(), %reason, "Process killed");
        self.inner.metrics.record_fatal();
        self.finish(process, EXIT_FAILURE, true)
    }

    /// Power the machine off and end the calling process silently
    pub fn halt(&self, process: &mut Process) -> Exited {
        info!(pid = process.id(), "Halt requested");
        self.inner.power.power_off();
        self.finish(process, EXIT_FAILURE, false)
    }

    /// Trap entry point: decode and run one system call for `process`
    pub fn syscall(&self, process: &mut Process, frame: &mut TrapFrame) -> Result<(), Exited> {
        if let Some(exited) = process.exited() {
            return Err(exited);
        }
        if self.is_powered_off() {
            return Err(self.finish(process, EXIT_FAILURE, false));
        }
        self.inner.dispatcher.dispatch(self, process, frame)
    }

    /// Write to the console in bounded chunks
    pub fn write_console(&self, bytes: &[u8]) {
        for chunk in bytes.chunks(self.inner.config.console_chunk.max(1)) {
            self.inner.console.put_bytes(chunk);
        }
    }

    fn finish(&self, process: &mut Process, code: ExitCode, announce: bool) -> Exited {
        if let Some(exited) = process.exited() {
            return exited;
        }
        process.set_exit_code(code);

        if announce
            && process.is_user()
            && self.inner.config.announce_exits
            && !self.is_powered_off()
        {
            self.write_console(format!("{}: exit({})\n", process.name(), code).as_bytes());
        }

        let closed = process.descriptors.close_all();
        let orphaned = process.children.release_all();
        self.inner.table.remove(&process.id());
        let observed = process
            .take_parent()
            .map(|parent| parent.deliver(code))
            .unwrap_or(false);

        info!(
            pid = process.id(),
            program = %process.name(),
            code,
            closed,
            orphaned,
            observed,
            "Process exited"
        );
        process.mark_terminated()
    }

    fn abandon(&self, parent: &mut Process, pid: Pid) {
        parent.children.discard(pid);
        self.inner.table.remove(&pid);
    }

    fn set_state(&self, pid: Pid, state: ProcessState) {
        if let Some(mut info) = self.inner.table.get_mut(&pid) {
            info.state = state;
        }
    }

    /// Body of a spawned process thread
    fn run_process(
        self,
        mut process: Process,
        argv: Vec<String>,
        ready: flume::Sender<Result<(), LoadError>>,
    ) {
        let span = info_span!("process", pid = process.id(), program = %process.name());
        let _entered = span.enter();

        let loaded = self
            .inner
            .loader
            .load(process.name())
            .and_then(|program| setup_stack(&mut process.memory, &argv).map(|stack| (program, stack)));

        let (program, stack) = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                // Resolve the record before the parent discards it
                let _ = self.finish(&mut process, EXIT_FAILURE, false);
                let _ = ready.send(Err(err));
                return;
            }
        };

        process.entry_esp = stack.esp;
        self.set_state(process.id(), ProcessState::Running);
        // The parent is blocked on the other end until this arrives
        let _ = ready.send(Ok(()));
        drop(ready);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut user = Userland::new(&self, &mut process);
            program.run(&mut user)
        }));

        let _ = match outcome {
            Ok(Ok(code)) => self.terminate(&mut process, code),
            Ok(Err(exited)) => exited,
            Err(_) => self.fault(&mut process, "panic in user program"),
        };
    }
}
