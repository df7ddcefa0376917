//! Filesystem roots used to reach device nodes and `/proc`.
//!
//! The roots are resolved once per collector from the first configuration
//! seen and never re-applied afterwards.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::Deserialize;
use tracing::debug;

use crate::collector::traits::FileSystem;

pub const DEFAULT_PROC_PATH: &str = "/proc";
pub const DEFAULT_DEV_PATH: &str = "/dev";

/// Description of one recognised configuration option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigOption {
    pub name: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Request-scoped configuration handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PathConfig {
    /// Path to the proc filesystem.
    pub proc_path: Option<String>,
    /// Path to the directory holding device nodes.
    pub dev_path: Option<String>,
}

impl PathConfig {
    /// Options accepted by the collector.
    pub const OPTIONS: &'static [ConfigOption] = &[
        ConfigOption {
            name: "proc_path",
            default: DEFAULT_PROC_PATH,
            description: "Path to the proc filesystem, must be an existing directory",
        },
        ConfigOption {
            name: "dev_path",
            default: DEFAULT_DEV_PATH,
            description: "Path to the device node directory, must be an existing directory",
        },
    ];

    pub fn new(proc_path: impl Into<String>, dev_path: impl Into<String>) -> Self {
        Self {
            proc_path: Some(proc_path.into()),
            dev_path: Some(dev_path.into()),
        }
    }
}

/// Resolved and validated filesystem roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    pub proc_path: PathBuf,
    pub dev_path: PathBuf,
}

impl Default for Roots {
    fn default() -> Self {
        Self {
            proc_path: PathBuf::from(DEFAULT_PROC_PATH),
            dev_path: PathBuf::from(DEFAULT_DEV_PATH),
        }
    }
}

/// A configured root is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing { option: &'static str, path: PathBuf },
    NotADirectory { option: &'static str, path: PathBuf },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing { option, path } => {
                write!(f, "{} {} does not exist", option, path.display())
            }
            ConfigError::NotADirectory { option, path } => {
                write!(f, "{} {} is not a directory", option, path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// One-shot resolver for [`Roots`].
///
/// Concurrent first calls serialize on the internal lock; exactly one of
/// them validates, the others observe its result.
pub struct ConfigGate<F: FileSystem> {
    fs: F,
    roots: Mutex<Option<Roots>>,
}

impl<F: FileSystem> ConfigGate<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            roots: Mutex::new(None),
        }
    }

    /// Returns the resolved roots, resolving them from `config` on first use.
    ///
    /// Once resolution has succeeded, later configurations are ignored.
    /// A failed resolution stores nothing.
    pub fn resolve(&self, config: Option<&PathConfig>) -> Result<Roots, ConfigError> {
        // The slot is only written after validation succeeds, so a poisoned
        // lock still guards a consistent value.
        let mut roots = self.roots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(resolved) = roots.as_ref() {
            return Ok(resolved.clone());
        }

        let config = config.cloned().unwrap_or_default();
        let proc_path = self.check_dir("proc_path", config.proc_path.as_deref(), DEFAULT_PROC_PATH)?;
        let dev_path = self.check_dir("dev_path", config.dev_path.as_deref(), DEFAULT_DEV_PATH)?;

        let resolved = Roots { proc_path, dev_path };
        debug!(
            "Resolved roots: proc={}, dev={}",
            resolved.proc_path.display(),
            resolved.dev_path.display()
        );
        *roots = Some(resolved.clone());
        Ok(resolved)
    }

    /// Returns the roots if they have already been resolved.
    pub fn resolved(&self) -> Option<Roots> {
        self.roots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_dir(
        &self,
        option: &'static str,
        value: Option<&str>,
        default: &str,
    ) -> Result<PathBuf, ConfigError> {
        let path = PathBuf::from(value.unwrap_or(default));
        if !self.fs.exists(&path) {
            return Err(ConfigError::Missing { option, path });
        }
        if !self.fs.is_dir(&path) {
            return Err(ConfigError::NotADirectory { option, path });
        }
        Ok(path)
    }
}
