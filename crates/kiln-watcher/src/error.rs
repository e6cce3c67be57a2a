//! Error types for watch setup.
//!
//! Watch failures are non-fatal: the caller logs, stays inert, and may
//! retry by reinitializing with a better path.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Things that can go wrong when installing a watch.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The requested root does not exist, or exists but is not a
    /// directory. Fix the configured path and reinitialize.
    #[error("watch root '{0}' does not exist or is not a directory")]
    MissingRoot(PathBuf),

    /// The platform refused access to the watch root.
    #[error("no permission to watch '{path}': {source}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// Any other failure from the platform watch backend.
    #[error("failed to watch '{path}': {source}")]
    Backend {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

impl WatchError {
    /// Classifies a notify error raised while watching `path`.
    pub(crate) fn from_notify(path: &Path, source: notify::Error) -> Self {
        match &source.kind {
            notify::ErrorKind::Io(io)
                if io.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                Self::PermissionDenied {
                    path: path.to_path_buf(),
                    source,
                }
            }
            notify::ErrorKind::PathNotFound => Self::MissingRoot(path.to_path_buf()),
            _ => Self::Backend {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// True for access-rights failures.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}
