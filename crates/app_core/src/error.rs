//! Application error types

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which sequence a navigation command walked off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Entity,
    Image,
}

/// Which end of the sequence was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    First,
    Last,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Entity => f.write_str("entity folder"),
            Level::Image => f.write_str("image"),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::First => f.write_str("first"),
            Edge::Last => f.write_str("last"),
        }
    }
}

/// Main application error type.
///
/// Session errors leave the session state as it was (except a table write
/// after a successful rename). `Config` only comes from loading or saving
/// the configuration file.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Navigation (informational, state unchanged) =====
    #[error("No subfolders found in {0}")]
    NoSubfoldersFound(PathBuf),

    #[error("Already at the {edge} {level}")]
    AtBoundary { level: Level, edge: Edge },

    #[error("No images in {0}")]
    NoImagesInFolder(PathBuf),

    #[error("Cannot decode {file}: {reason}")]
    DecodeError { file: String, reason: String },

    #[error("Folder not found: {0}")]
    FolderNotFound(PathBuf),

    #[error("No parent folder loaded")]
    NoParentLoaded,

    // ===== Label commit =====
    #[error("Label is empty")]
    EmptyLabel,

    #[error("Label {label:?} cannot be used: {reason}")]
    InvalidLabel { label: String, reason: String },

    #[error("Cannot rename {from} to {to}: {source}")]
    RenameFailed {
        from: String,
        to: String,
        #[source]
        source: app_fs::FileOpError,
    },

    #[error("Cannot read label table: {0}")]
    TableReadError(#[source] app_db::DbError),

    #[error("Cannot write label table: {0}")]
    TableWriteError(#[source] app_db::DbError),

    // ===== Ambient =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::NoSubfoldersFound(_) => {
                "No subfolders found in the selected parent folder.".to_string()
            }
            AppError::AtBoundary { level: Level::Entity, edge: Edge::Last } => {
                "No more folders.".to_string()
            }
            AppError::AtBoundary { level: Level::Entity, edge: Edge::First } => {
                "This is the first folder; no previous folder to display.".to_string()
            }
            AppError::AtBoundary { level: Level::Image, edge: Edge::Last } => {
                "No more images in the folder.".to_string()
            }
            AppError::AtBoundary { level: Level::Image, edge: Edge::First } => {
                "This is the first image; no previous image to display.".to_string()
            }
            AppError::NoImagesInFolder(_) => "No images in this folder.".to_string(),
            AppError::DecodeError { file, .. } => format!("Cannot load image: {}", file),
            AppError::EmptyLabel => "Please enter a label.".to_string(),
            AppError::RenameFailed { to, source, .. } => {
                format!("Error renaming folder to {}: {}", to, source)
            }
            _ => self.to_string(),
        }
    }
}

impl From<app_fs::FsError> for AppError {
    fn from(e: app_fs::FsError) -> Self {
        match e {
            app_fs::FsError::NotFound(p) => AppError::FolderNotFound(PathBuf::from(p)),
            app_fs::FsError::InvalidPath(msg) => {
                AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, msg))
            }
            app_fs::FsError::Io(e) => AppError::Io(e),
        }
    }
}

impl From<app_db::DbError> for AppError {
    fn from(e: app_db::DbError) -> Self {
        match e {
            app_db::DbError::Write { .. } => AppError::TableWriteError(e),
            _ => AppError::TableReadError(e),
        }
    }
}
