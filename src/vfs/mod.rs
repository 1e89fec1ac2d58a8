/*!
 * Virtual File System Module
 * File primitives consumed by the process layer
 */

pub mod memory;
pub mod traits;
pub mod types;

// Re-exports
pub use memory::MemFs;
pub use traits::{FileHandle, FileSystem};
pub use types::{VfsError, VfsResult};
