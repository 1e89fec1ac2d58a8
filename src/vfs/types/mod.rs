/*!
 * VFS Types
 * Shared types for filesystem operations
 */

mod errors;

pub use errors::{VfsError, VfsResult};
