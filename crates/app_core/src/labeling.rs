//! Label commit: folder naming, rename, label table upsert

use crate::navigation::EntityList;
use crate::AppError;
use app_db::{LabelTable, Upsert};
use app_fs::FileOperations;
use std::path::PathBuf;

/// Separates the entity id from its label in a folder name ("42_sedan")
pub const ID_SEPARATOR: char = '_';

/// Whether the folder was renamed on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    /// The folder already carried the requested name
    NoRenameNeeded,
}

/// Result of a successful label commit
#[derive(Debug, Clone)]
pub struct CommitReport {
    pub previous_name: String,
    pub folder_name: String,
    pub rename: RenameOutcome,
    pub entity_id: String,
    pub label: String,
    pub table_path: PathBuf,
    pub upsert: Upsert,
}

/// Entity id of a folder name: everything before the first separator
pub fn id_part(name: &str) -> &str {
    name.split(ID_SEPARATOR).next().unwrap_or(name)
}

/// Folder name an entity gets once labeled `label`.
///
/// A label that itself contains the separator is taken as a complete
/// `id_label` name. Otherwise the current id is kept and the label replaced.
pub fn canonical_folder_name(current: &str, label: &str) -> String {
    if label.contains(ID_SEPARATOR) {
        label.to_string()
    } else {
        format!("{}{}{}", id_part(current), ID_SEPARATOR, label)
    }
}

/// Reject names that cannot be a single folder inside the parent
fn check_folder_name(name: &str, label: &str) -> Result<(), AppError> {
    let invalid = |reason: &str| AppError::InvalidLabel {
        label: label.to_string(),
        reason: reason.to_string(),
    };

    if name.contains(['/', '\\', '\0']) {
        return Err(invalid("folder names cannot contain path separators"));
    }
    if name == "." || name == ".." {
        return Err(invalid("not a folder name"));
    }
    if id_part(name).is_empty() {
        return Err(invalid("folder name has no id before the separator"));
    }
    Ok(())
}

/// Label the selected entity.
///
/// Steps run in order and stop at the first failure: a failed rename leaves
/// the folder, the entity list and the table untouched. A failed table write
/// happens after the rename, which stays applied.
pub fn commit_label(
    entities: &mut EntityList,
    raw_label: &str,
    table_file_name: &str,
    file_ops: &dyn FileOperations,
) -> Result<CommitReport, AppError> {
    let label = raw_label.trim();
    if label.is_empty() {
        return Err(AppError::EmptyLabel);
    }

    let current_name = entities.current_name().to_string();
    let new_name = canonical_folder_name(&current_name, label);
    check_folder_name(&new_name, label)?;

    let rename = if new_name == current_name {
        tracing::info!("Folder name already matches the label format: {}", current_name);
        RenameOutcome::NoRenameNeeded
    } else {
        let from = entities.current_folder();
        let to = entities.parent().join(&new_name);
        if let Err(source) = file_ops.rename(&from, &to) {
            tracing::warn!("Error renaming folder {} -> {}: {}", current_name, new_name, source);
            return Err(AppError::RenameFailed {
                from: current_name,
                to: new_name,
                source,
            });
        }
        entities.rename_current(&new_name);
        RenameOutcome::Renamed
    };

    let entity_id = id_part(&new_name).to_string();
    let table_path = LabelTable::path_in(entities.parent(), table_file_name);

    let mut table = LabelTable::load(&table_path)?;
    let upsert = table.upsert(&entity_id, label);
    table.save()?;

    tracing::info!(
        id = %entity_id,
        label = %label,
        folder = %new_name,
        "Label updated in {}",
        table_path.display()
    );

    Ok(CommitReport {
        previous_name: current_name,
        folder_name: new_name,
        rename,
        entity_id,
        label: label.to_string(),
        table_path,
        upsert,
    })
}
