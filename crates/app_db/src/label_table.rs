//! CSV-backed ID -> LABEL table

use crate::{DbError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the label table inside the parent folder
pub const DEFAULT_TABLE_FILE_NAME: &str = "labels.csv";

/// Header row written at the top of every table
pub const HEADER: [&str; 2] = ["ID", "LABEL"];

/// One row of the label table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "LABEL", default)]
    pub label: String,
}

/// What an upsert did to the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated { previous: String },
    Unchanged,
}

/// In-memory copy of the label table, keyed by id, in file order
#[derive(Debug, Clone)]
pub struct LabelTable {
    path: PathBuf,
    records: Vec<LabelRecord>,
}

impl LabelTable {
    /// Table location for a parent folder
    pub fn path_in(parent: &Path, file_name: &str) -> PathBuf {
        parent.join(file_name)
    }

    /// Load the table at `path`. A missing or zero-length file is an empty table.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            tracing::debug!("No label table at {}, starting empty", path.display());
            return Ok(Self { path, records: Vec::new() });
        }

        let read_err = |source| DbError::Read { path: path.clone(), source };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)
            .map_err(read_err)?;

        let headers = reader.headers().map_err(read_err)?.clone();
        if headers.is_empty() {
            return Ok(Self { path, records: Vec::new() });
        }
        if !HEADER.iter().all(|h| headers.iter().any(|f| f == *h)) {
            return Err(DbError::Header {
                path,
                found: headers.iter().collect::<Vec<_>>().join(","),
            });
        }

        let mut records = Vec::new();
        for row in reader.deserialize::<LabelRecord>() {
            records.push(row.map_err(read_err)?);
        }

        tracing::debug!("Loaded {} label rows from {}", records.len(), path.display());
        Ok(Self { path, records })
    }

    /// Overwrite the label of `id`, or append a new row at the end
    pub fn upsert(&mut self, id: &str, label: &str) -> Upsert {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) if record.label == label => Upsert::Unchanged,
            Some(record) => {
                let previous = std::mem::replace(&mut record.label, label.to_string());
                Upsert::Updated { previous }
            }
            None => {
                self.records.push(LabelRecord {
                    id: id.to_string(),
                    label: label.to_string(),
                });
                Upsert::Inserted
            }
        }
    }

    /// Rewrite the whole table. The new content is written to a temporary
    /// file in the same directory and renamed over the old one.
    pub fn save(&self) -> Result<()> {
        let write_err = |source| DbError::Write { path: self.path.clone(), source };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .terminator(csv::Terminator::CRLF)
                .from_writer(tmp.as_file_mut());

            writer.write_record(HEADER).map_err(|e| write_err(e.into()))?;
            for record in &self.records {
                writer
                    .write_record([record.id.as_str(), record.label.as_str()])
                    .map_err(|e| write_err(e.into()))?;
            }
            writer.flush().map_err(write_err)?;
        }
        tmp.as_file_mut().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::info!("Label table written: {} ({} rows)", self.path.display(), self.records.len());
        Ok(())
    }

    /// Label stored for `id`
    pub fn get(&self, id: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.label.as_str())
    }

    pub fn records(&self) -> &[LabelRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
