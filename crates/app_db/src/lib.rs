//! Batch Labeler Persistence Layer
//!
//! Provides the label table: one `ID,LABEL` row per entity, stored as CSV
//! next to the entity folders and rewritten whole on every change.

mod label_table;

pub use label_table::{LabelRecord, LabelTable, Upsert, HEADER, DEFAULT_TABLE_FILE_NAME};

use std::path::PathBuf;
use thiserror::Error;

/// Label table errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Cannot read label table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Cannot write label table {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Label table {path} has an unexpected header: {found}")]
    Header { path: PathBuf, found: String },
}

pub type Result<T> = std::result::Result<T, DbError>;
