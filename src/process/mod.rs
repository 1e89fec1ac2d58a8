/*!
 * Process Module
 * Descriptor tables, child records, program loading and the process lifecycle
 */

pub mod builder;
pub mod control;
pub mod descriptors;
pub mod lifecycle;
pub mod loader;
pub mod registry;
pub mod rendezvous;
pub mod stack;
pub mod types;

// Re-export for convenience
pub use builder::KernelBuilder;
pub use control::{ParentLink, Process};
pub use descriptors::{DescriptorError, DescriptorTable, OpenFile};
pub use lifecycle::Kernel;
pub use loader::{Program, ProgramEntry, ProgramLoader, ProgramTable};
pub use registry::{ChildRecord, ChildRegistry};
pub use rendezvous::{exit_rendezvous, ExitNotifier, ExitWatch};
pub use stack::{CommandLine, InitialStack};
pub use types::{
    Exited, LoadError, ProcessError, ProcessInfo, ProcessResult, ProcessState, WaitError,
};
