//! Error types for rebuild execution.
//!
//! Rebuild failures are expected operating conditions, not crashes: the
//! trigger logs them and stays ready for the next save.

use thiserror::Error;

/// Convenience type for rebuild operations.
pub type Result<T> = std::result::Result<T, RebuildError>;

/// Things that can go wrong while running a rebuild.
#[derive(Error, Debug)]
pub enum RebuildError {
    /// The rebuild command could not be started at all. Usually a typo in
    /// the configured program name, or the tool is not on PATH.
    #[error("failed to launch rebuild command: {0}")]
    Launch(#[from] std::io::Error),

    /// The rebuild command ran and reported failure.
    #[error("rebuild command exited with {status}")]
    CommandFailed { status: std::process::ExitStatus },

    /// Anything else a runner wants to surface.
    #[error("{0}")]
    Failed(String),
}

impl RebuildError {
    /// Creates a free-text rebuild error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
