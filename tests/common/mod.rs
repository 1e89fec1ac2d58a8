/*!
 * Shared test harness
 */

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use userprog_kernel::core::types::ExitCode;
use userprog_kernel::{
    BufferConsole, Kernel, KernelConfig, MemFs, ProgramTable, SoftPower, UserResult, Userland,
};

/// A kernel wired to in-memory devices the test can inspect
pub struct Harness {
    pub kernel: Kernel,
    pub console: BufferConsole,
    pub fs: Arc<MemFs>,
    pub programs: ProgramTable,
    pub power: SoftPower,
}

impl Harness {
    /// Exit announcements off, so console output is exactly what programs wrote
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default().with_announce_exits(false))
    }

    pub fn with_config(config: KernelConfig) -> Self {
        Self::with_console(config, BufferConsole::new())
    }

    pub fn with_console(config: KernelConfig, console: BufferConsole) -> Self {
        let fs = Arc::new(MemFs::with_capacity(config.max_fs_bytes));
        let programs = ProgramTable::new();
        let power = SoftPower::new();
        let kernel = Kernel::builder()
            .with_config(config)
            .with_filesystem(fs.clone())
            .with_console(Arc::new(console.clone()))
            .with_loader(Arc::new(programs.clone()))
            .with_power(Arc::new(power.clone()))
            .build();
        Self {
            kernel,
            console,
            fs,
            programs,
            power,
        }
    }

    pub fn program<F>(&self, name: &str, entry: F)
    where
        F: Fn(&mut Userland<'_>) -> UserResult<ExitCode> + Send + Sync + 'static,
    {
        self.programs.register(name, entry);
    }

    /// Run `command_line` under a fresh root process
    pub fn run(&self, command_line: &str) -> ExitCode {
        self.kernel
            .run_task(command_line)
            .expect("task should load")
    }

    pub fn output(&self) -> String {
        self.console.output_string()
    }
}

/// Values recorded by user programs for the test to check afterwards
#[derive(Clone)]
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> Recorder<T> {
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, value: T) {
        self.values.lock().push(value);
    }

    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }
}

/// Poll `condition` until it holds or five seconds pass
pub fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
