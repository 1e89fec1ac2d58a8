/*!
 * Monitoring
 * Tracing setup and syscall counters
 */

mod metrics;
mod tracer;

pub use metrics::{MetricsSnapshot, SyscallMetrics};
pub use tracer::{init_tracing, TRACE_JSON_ENV};
