//! Error taxonomy for the rescue boot orchestrator.
//!
//! Advisory problems (integrity mismatches, failing setup units) are not
//! errors at all: they are reported through verdicts and reports. Only
//! conditions the boot cannot carry on from surface as `RescueError`.

use thiserror::Error;

/// Result alias used across the rescue crates.
pub type RescueResult<T> = Result<T, RescueError>;

#[derive(Debug, Error)]
pub enum RescueError {
    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem layout problems (missing directories, unreadable files).
    #[error("storage error: {0}")]
    Storage(String),

    /// An external program (setup unit, recovery tool, reboot) could not be run.
    #[error("engine error: {0}")]
    Engine(String),

    /// An operation was requested in a mode that does not permit it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
