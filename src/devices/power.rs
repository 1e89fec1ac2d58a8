/*!
 * Power Control
 * Machine shutdown primitive
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Shutdown primitive consumed by the `halt` call
pub trait PowerControl: Send + Sync {
    /// Power the machine off
    fn power_off(&self);

    /// Whether the machine has been powered off
    fn is_off(&self) -> bool;
}

/// Power switch that only records the shutdown
#[derive(Debug, Clone, Default)]
pub struct SoftPower {
    off: Arc<AtomicBool>,
}

impl SoftPower {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PowerControl for SoftPower {
    fn power_off(&self) {
        if !self.off.swap(true, Ordering::SeqCst) {
            info!("Powering off...");
        }
    }

    fn is_off(&self) -> bool {
        self.off.load(Ordering::SeqCst)
    }
}
