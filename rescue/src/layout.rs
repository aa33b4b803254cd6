//! Filesystem layout of the rescue system.

use crate::constants::{config, paths};
use rescue_shared::errors::{RescueError, RescueResult};
use std::path::{Path, PathBuf};

/// Resolves the well-known rescue paths against a root directory.
///
/// The root is `/` on a booted rescue system. Tests point it at a temporary
/// directory.
#[derive(Debug, Clone)]
pub struct RescueLayout {
    root: PathBuf,
}

impl RescueLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout of the running system.
    pub fn system() -> Self {
        Self::new("/")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path written relative to the rescue root.
    ///
    /// Leading `/` and `./` are stripped so manifest entries written either
    /// way land under the root.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        let trimmed = relative.trim_start_matches("./").trim_start_matches('/');
        self.root.join(trimmed)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(paths::MANIFEST)
    }

    pub fn motd_path(&self) -> PathBuf {
        self.resolve(paths::MOTD)
    }

    pub fn issue_path(&self) -> PathBuf {
        self.resolve(paths::ISSUE)
    }

    /// Greeting files cleared when the operator drops to a shell.
    pub fn banner_paths(&self) -> [PathBuf; 2] {
        [self.issue_path(), self.motd_path()]
    }

    pub fn setup_dir(&self) -> PathBuf {
        self.resolve(paths::SETUP_DIR)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.resolve(paths::LOG_DIR)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.resolve(paths::CONFIG_DIR)
    }

    /// Configuration files in load order.
    pub fn config_files(&self) -> Vec<PathBuf> {
        let dir = self.config_dir();
        config::FILES.iter().map(|name| dir.join(name)).collect()
    }

    /// Create directories the orchestrator writes into.
    pub fn prepare(&self) -> RescueResult<()> {
        let log_dir = self.log_dir();
        std::fs::create_dir_all(&log_dir).map_err(|e| {
            RescueError::Storage(format!(
                "Failed to create log directory {}: {}",
                log_dir.display(),
                e
            ))
        })
    }
}
