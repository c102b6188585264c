//! Batch Labeler File System Layer
//!
//! Provides:
//! - Directory browsing: entity folders and image files, in a chosen order
//! - File operations: folder rename behind a swappable trait

mod browser;
mod file_operations;

pub use browser::{
    FileEntry, ListOptions, ListOrder, has_extension, list_directory, list_images,
    DEFAULT_IMAGE_EXTENSIONS,
};
pub use file_operations::{DefaultFileOperations, FileOpError, FileOperations};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
