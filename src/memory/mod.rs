/*!
 * Memory Module
 * Simulated user address spaces
 */

pub mod types;
pub mod user;

// Re-export for convenience
pub use types::*;
pub use user::{page_round_down, UserMemory};
