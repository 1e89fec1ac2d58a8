/*!
 * Kernel Configuration
 *
 * Runtime configuration loaded from an optional JSON file plus environment
 * overrides. Every field has a default so an empty file is valid.
 */

use super::errors::KernelError;
use super::limits::{
    DEFAULT_CONSOLE_CHUNK, DEFAULT_MAX_ARGS, DEFAULT_MAX_COMMAND_LINE, DEFAULT_MAX_FS_BYTES,
    DEFAULT_MAX_OPEN_FILES,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Env var naming a JSON configuration file
pub const CONFIG_PATH_ENV: &str = "KERNEL_CONFIG";

/// Env override for [`KernelConfig::announce_exits`]
pub const ANNOUNCE_EXITS_ENV: &str = "KERNEL_ANNOUNCE_EXITS";

/// Env override for [`KernelConfig::max_open_files`]
pub const MAX_OPEN_FILES_ENV: &str = "KERNEL_MAX_OPEN_FILES";

/// Kernel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct KernelConfig {
    /// Print `name: exit(code)` when a user process terminates
    pub announce_exits: bool,
    /// Largest slice handed to the console per write
    pub console_chunk: usize,
    /// Open files a single process may hold at once
    pub max_open_files: usize,
    /// Longest command line exec accepts, in bytes
    pub max_command_line: usize,
    /// Most words exec accepts on a command line
    pub max_args: usize,
    /// Bytes the default in-memory filesystem may hold across all files
    pub max_fs_bytes: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            announce_exits: true,
            console_chunk: DEFAULT_CONSOLE_CHUNK,
            max_open_files: DEFAULT_MAX_OPEN_FILES,
            max_command_line: DEFAULT_MAX_COMMAND_LINE,
            max_args: DEFAULT_MAX_ARGS,
            max_fs_bytes: DEFAULT_MAX_FS_BYTES,
        }
    }
}

impl KernelConfig {
    /// Load from `KERNEL_CONFIG` (if set) and apply env overrides
    pub fn load() -> Result<Self, KernelError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env()?;
        debug!(?config, "Kernel configuration loaded");
        Ok(config)
    }

    /// Parse a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self, KernelError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            KernelError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Parse configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self, KernelError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| KernelError::Configuration(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `KERNEL_*` environment overrides
    pub fn apply_env(&mut self) -> Result<(), KernelError> {
        if let Ok(value) = std::env::var(ANNOUNCE_EXITS_ENV) {
            self.announce_exits = matches!(value.as_str(), "1" | "true" | "yes");
        }
        if let Ok(value) = std::env::var(MAX_OPEN_FILES_ENV) {
            self.max_open_files = value.parse().map_err(|_| {
                KernelError::Configuration(format!("{}={} is not a number", MAX_OPEN_FILES_ENV, value))
            })?;
        }
        self.validate()
    }

    #[inline]
    #[must_use]
    pub fn with_announce_exits(mut self, announce: bool) -> Self {
        self.announce_exits = announce;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_open_files(mut self, limit: usize) -> Self {
        self.max_open_files = limit;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_console_chunk(mut self, chunk: usize) -> Self {
        self.console_chunk = chunk;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_fs_bytes(mut self, bytes: usize) -> Self {
        self.max_fs_bytes = bytes;
        self
    }

    fn validate(&self) -> Result<(), KernelError> {
        if self.console_chunk == 0 {
            return Err(KernelError::Configuration("console_chunk must be positive".into()));
        }
        if self.max_args == 0 || self.max_command_line == 0 {
            return Err(KernelError::Configuration(
                "command line limits must be positive".into(),
            ));
        }
        if self.max_fs_bytes == 0 {
            return Err(KernelError::Configuration("max_fs_bytes must be positive".into()));
        }
        Ok(())
    }
}
