/*!
 * Syscall Metrics
 * Lock-free per-call counters
 */

use crate::syscalls::SyscallNumber;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const CALLS: usize = SyscallNumber::ALL.len();

/// Counters updated on every trap
#[derive(Debug, Default)]
pub struct SyscallMetrics {
    calls: [AtomicU64; CALLS],
    unknown: AtomicU64,
    fatal: AtomicU64,
}

/// Point-in-time copy of [`SyscallMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Calls decoded, by name; calls never made are omitted
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub calls: BTreeMap<String, u64>,
    /// Traps with a call number outside the table
    pub unknown: u64,
    /// Processes killed by a fault or protocol violation
    pub fatal: u64,
}

impl MetricsSnapshot {
    /// Decoded calls of every kind
    pub fn total(&self) -> u64 {
        self.calls.values().sum()
    }
}

impl SyscallMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&self, number: SyscallNumber) {
        self.calls[number.code() as usize].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_unknown(&self, code: u32) {
        debug!(code, "Unknown syscall number");
        self.unknown.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_fatal(&self) {
        self.fatal.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn count(&self, number: SyscallNumber) -> u64 {
        self.calls[number.code() as usize].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fatal_count(&self) -> u64 {
        self.fatal.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let calls = SyscallNumber::ALL
            .iter()
            .map(|&number| (number.name().to_string(), self.count(number)))
            .filter(|&(_, count)| count > 0)
            .collect();
        MetricsSnapshot {
            calls,
            unknown: self.unknown.load(Ordering::Relaxed),
            fatal: self.fatal_count(),
        }
    }
}
