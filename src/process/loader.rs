/*!
 * Program Loader
 *
 * Resolves a program name to an executable image. Images are Rust entry
 * points that reach the kernel only through [`Userland`].
 */

use super::types::LoadError;
use crate::core::types::ExitCode;
use crate::userland::{UserResult, Userland};
use ahash::RandomState;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Entry point of a user program; `Ok(code)` is an implicit `exit(code)`
pub type ProgramEntry = Arc<dyn Fn(&mut Userland<'_>) -> UserResult<ExitCode> + Send + Sync>;

/// A loadable program image
#[derive(Clone)]
pub struct Program {
    name: String,
    entry: ProgramEntry,
}

impl Program {
    pub fn new<F>(name: impl Into<String>, entry: F) -> Self
    where
        F: Fn(&mut Userland<'_>) -> UserResult<ExitCode> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            entry: Arc::new(entry),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the image to completion on the calling thread
    #[inline]
    pub fn run(&self, user: &mut Userland<'_>) -> UserResult<ExitCode> {
        (self.entry)(user)
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program").field("name", &self.name).finish()
    }
}

/// Program loading primitive consumed by `exec`
pub trait ProgramLoader: Send + Sync {
    /// Resolve `name` to a runnable image
    fn load(&self, name: &str) -> Result<Program, LoadError>;
}

/// Loader backed by a table of registered programs
#[derive(Clone, Default)]
pub struct ProgramTable {
    programs: Arc<DashMap<String, Program, RandomState>>,
}

impl ProgramTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a program (builder form)
    #[must_use]
    pub fn with_program<F>(self, name: &str, entry: F) -> Self
    where
        F: Fn(&mut Userland<'_>) -> UserResult<ExitCode> + Send + Sync + 'static,
    {
        self.register(name, entry);
        self
    }

    /// Register or replace a program
    pub fn register<F>(&self, name: &str, entry: F)
    where
        F: Fn(&mut Userland<'_>) -> UserResult<ExitCode> + Send + Sync + 'static,
    {
        self.programs.insert(name.to_string(), Program::new(name, entry));
    }

    /// Registered program names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.programs.iter().map(|p| p.key().clone()).collect();
        names.sort();
        names
    }
}

impl ProgramLoader for ProgramTable {
    fn load(&self, name: &str) -> Result<Program, LoadError> {
        self.programs
            .get(name)
            .map(|program| program.value().clone())
            .ok_or_else(|| LoadError::NotFound(name.to_string()))
    }
}
