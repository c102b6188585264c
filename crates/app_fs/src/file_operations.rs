//! File operations module
//! Provides the folder rename used when an entity is relabeled

use std::path::{Path, PathBuf};
use thiserror::Error;

/// File operation errors
#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("File already exists: {0}")]
    AlreadyExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, FileOpError>;

/// File operations trait
pub trait FileOperations {
    /// Rename a file or directory. Never overwrites an existing target.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
}

/// Default implementation of file operations backed by `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFileOperations;

impl DefaultFileOperations {
    pub fn new() -> Self {
        Self
    }
}

impl FileOperations for DefaultFileOperations {
    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if !from.exists() {
            return Err(FileOpError::NotFound(from.to_path_buf()));
        }

        // POSIX rename silently replaces an empty target directory
        if to.exists() {
            return Err(FileOpError::AlreadyExists(to.to_path_buf()));
        }

        std::fs::rename(from, to).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => FileOpError::PermissionDenied(from.to_path_buf()),
            _ => FileOpError::Io(e),
        })?;
        tracing::info!("Renamed: {} -> {}", from.display(), to.display());

        Ok(())
    }
}
