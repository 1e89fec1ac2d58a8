/*!
 * Console Device
 * Byte-oriented display output and keyboard input
 */

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::Arc;
use tracing::warn;

/// Console primitives consumed by the process layer
pub trait Console: Send + Sync {
    /// Write bytes to the display exactly as given
    fn put_bytes(&self, bytes: &[u8]);

    /// Block until one byte of input is available and return it
    fn get_byte(&self) -> u8;
}

#[derive(Default)]
struct ConsoleState {
    output: Vec<u8>,
    input: VecDeque<u8>,
    writes: usize,
}

/// Console backed by in-memory buffers
///
/// Cloning shares the buffers, so a test can keep a handle while the kernel
/// owns another.
#[derive(Clone, Default)]
pub struct BufferConsole {
    state: Arc<Mutex<ConsoleState>>,
    input_ready: Arc<Condvar>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console with keyboard input already queued
    pub fn with_input(input: &[u8]) -> Self {
        let console = Self::new();
        console.push_input(input);
        console
    }

    /// Queue keyboard input and wake any blocked reader
    pub fn push_input(&self, input: &[u8]) {
        self.state.lock().input.extend(input.iter().copied());
        self.input_ready.notify_all();
    }

    /// Everything written so far
    pub fn output(&self) -> Vec<u8> {
        self.state.lock().output.clone()
    }

    /// Everything written so far, lossily decoded
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.state.lock().output).into_owned()
    }

    /// Number of `put_bytes` calls received
    pub fn write_calls(&self) -> usize {
        self.state.lock().writes
    }

    /// Discard captured output
    pub fn clear_output(&self) {
        self.state.lock().output.clear();
    }
}

impl Console for BufferConsole {
    fn put_bytes(&self, bytes: &[u8]) {
        let mut state = self.state.lock();
        state.output.extend_from_slice(bytes);
        state.writes += 1;
    }

    fn get_byte(&self) -> u8 {
        let mut state = self.state.lock();
        loop {
            if let Some(byte) = state.input.pop_front() {
                return byte;
            }
            self.input_ready.wait(&mut state);
        }
    }
}

/// Console wired to the host's stdin/stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn put_bytes(&self, bytes: &[u8]) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(bytes).and_then(|_| out.flush()) {
            warn!(error = %e, "Console write failed");
        }
    }

    fn get_byte(&self) -> u8 {
        let mut byte = [0u8; 1];
        match std::io::stdin().lock().read(&mut byte) {
            Ok(1) => byte[0],
            // End of input reads as NUL, like an idle keyboard controller
            Ok(_) => 0,
            Err(e) => {
                warn!(error = %e, "Console read failed");
                0
            }
        }
    }
}
