/*!
 * Kernel Builder
 * Builder pattern for Kernel construction
 */

use super::lifecycle::{Kernel, KernelInner};
use super::loader::{ProgramLoader, ProgramTable};
use crate::core::config::KernelConfig;
use crate::core::id::PidAllocator;
use crate::devices::{BufferConsole, Console, PowerControl, SoftPower};
use crate::monitoring::SyscallMetrics;
use crate::syscalls::SyscallDispatcher;
use crate::vfs::{FileSystem, MemFs};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

/// Builder for [`Kernel`]
///
/// Every collaborator has a default: an empty `MemFs` capped at
/// `max_fs_bytes`, a `BufferConsole`, an empty `ProgramTable` and a
/// `SoftPower` switch.
#[derive(Default)]
pub struct KernelBuilder {
    config: Option<KernelConfig>,
    fs: Option<Arc<dyn FileSystem>>,
    console: Option<Arc<dyn Console>>,
    loader: Option<Arc<dyn ProgramLoader>>,
    power: Option<Arc<dyn PowerControl>>,
    first_pid: Option<u32>,
}

impl KernelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: KernelConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = Some(console);
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn ProgramLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_power(mut self, power: Arc<dyn PowerControl>) -> Self {
        self.power = Some(power);
        self
    }

    /// First process id handed out (default 1)
    pub fn with_first_pid(mut self, pid: u32) -> Self {
        self.first_pid = Some(pid);
        self
    }

    pub fn build(self) -> Kernel {
        let config = self.config.unwrap_or_default();
        info!(
            announce_exits = config.announce_exits,
            max_open_files = config.max_open_files,
            max_fs_bytes = config.max_fs_bytes,
            "Kernel initialized"
        );
        let fs = self
            .fs
            .unwrap_or_else(|| Arc::new(MemFs::with_capacity(config.max_fs_bytes)));
        Kernel::from_inner(KernelInner {
            config,
            fs,
            console: self
                .console
                .unwrap_or_else(|| Arc::new(BufferConsole::new())),
            loader: self
                .loader
                .unwrap_or_else(|| Arc::new(ProgramTable::new())),
            power: self.power.unwrap_or_else(|| Arc::new(SoftPower::new())),
            pids: self.first_pid.map(PidAllocator::new).unwrap_or_default(),
            table: DashMap::with_hasher(RandomState::new()),
            metrics: SyscallMetrics::new(),
            dispatcher: SyscallDispatcher::new(),
        })
    }
}
