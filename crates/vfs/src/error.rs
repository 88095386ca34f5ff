// crates/vfs/src/error.rs

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for adapter operations.
///
/// `NotFound` and `PermissionDenied` are the only classes the engine
/// reacts to; everything else propagates unchanged.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("\"{}\": no such file or directory", .0.display())]
    NotFound(PathBuf),
    #[error("\"{}\": permission denied ({detail})", path.display())]
    PermissionDenied { path: PathBuf, detail: String },
    #[error("\"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("\"{}\": {message}", path.display())]
    Remote { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, FsError>;

impl FsError {
    /// Attach a path to an I/O error, classifying the well-known kinds.
    pub fn io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied {
                path: path.to_path_buf(),
                detail: source.to_string(),
            },
            _ => FsError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, FsError::PermissionDenied { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            FsError::NotFound(path) => path,
            FsError::PermissionDenied { path, .. } => path,
            FsError::Io { path, .. } => path,
            FsError::Remote { path, .. } => path,
        }
    }
}
