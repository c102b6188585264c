//! Directory browsing - entity folders and image files

use crate::{FsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions accepted as images when the caller does not supply its own list
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// File entry with metadata
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub is_hidden: bool,
}

impl FileEntry {
    /// Create a new file entry from path (follows symlinks)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let metadata = fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let is_hidden = name.starts_with('.');

        Ok(Self {
            path: path.to_path_buf(),
            name,
            is_dir: metadata.is_dir(),
            is_hidden,
        })
    }
}

/// Order in which listed entries are returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListOrder {
    /// Whatever order the platform enumerates the directory in.
    /// Not reproducible across machines or file systems.
    #[serde(rename = "filesystem")]
    Filesystem,
    /// Case-insensitive natural name order ("2.jpg" before "10.jpg")
    #[default]
    #[serde(rename = "natural")]
    Natural,
}

/// Options for listing directory contents
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub show_hidden: bool,
    pub show_directories: bool,
    pub show_files: bool,
    pub order: ListOrder,
    /// Lowercase extensions files must carry; `None` accepts any file
    pub filter_extensions: Option<Vec<String>>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            show_hidden: true,
            show_directories: true,
            show_files: true,
            order: ListOrder::default(),
            filter_extensions: None,
        }
    }
}

impl ListOptions {
    /// Immediate subdirectories only
    pub fn directories_only(order: ListOrder) -> Self {
        Self {
            show_files: false,
            order,
            ..Default::default()
        }
    }

    /// Image files only, matched case-insensitively against `extensions`
    pub fn images_only<S: AsRef<str>>(extensions: &[S], order: ListOrder) -> Self {
        Self {
            show_directories: false,
            order,
            filter_extensions: Some(
                extensions
                    .iter()
                    .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                    .collect(),
            ),
            ..Default::default()
        }
    }
}

/// List directory contents (non-recursive)
pub fn list_directory<P: AsRef<Path>>(path: P, options: &ListOptions) -> Result<Vec<FileEntry>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FsError::NotFound(path.display().to_string()));
    }

    if !path.is_dir() {
        return Err(FsError::InvalidPath(format!("Not a directory: {}", path.display())));
    }

    let mut entries = Vec::new();

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_entry = match FileEntry::from_path(entry.path()) {
            Ok(e) => e,
            Err(e) => {
                // Dangling symlinks and entries removed mid-scan
                tracing::debug!("Skipping unreadable entry {:?}: {}", entry.path(), e);
                continue;
            }
        };

        if !options.show_hidden && file_entry.is_hidden {
            continue;
        }

        if !options.show_directories && file_entry.is_dir {
            continue;
        }

        if !options.show_files && !file_entry.is_dir {
            continue;
        }

        if let Some(ref exts) = options.filter_extensions {
            if !file_entry.is_dir && !has_extension(&file_entry.name, exts) {
                continue;
            }
        }

        entries.push(file_entry);
    }

    if options.order == ListOrder::Natural {
        entries.sort_by(|a, b| natural_sort_key(&a.name).cmp(&natural_sort_key(&b.name)));
    }

    tracing::debug!("Listed {} entries in {}", entries.len(), path.display());
    Ok(entries)
}

/// Names of the image files directly inside `path`
pub fn list_images<P: AsRef<Path>, S: AsRef<str>>(
    path: P,
    extensions: &[S],
    order: ListOrder,
) -> Result<Vec<String>> {
    let entries = list_directory(path, &ListOptions::images_only(extensions, order))?;
    Ok(entries.into_iter().map(|e| e.name).collect())
}

/// Case-insensitive suffix check on a bare file name.
/// A name that is only the suffix (".jpg") still matches.
pub fn has_extension<S: AsRef<str>>(name: &str, extensions: &[S]) -> bool {
    let name = name.to_lowercase();
    extensions.iter().any(|allowed| {
        let ext = allowed.as_ref().trim_start_matches('.').to_lowercase();
        !ext.is_empty()
            && name
                .strip_suffix(ext.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
    })
}

/// Generate a natural sort key (handles numbers correctly)
/// "image2.jpg" < "image10.jpg"
fn natural_sort_key(s: &str) -> Vec<NaturalSortPart> {
    let mut parts = Vec::new();
    let mut current_num = String::new();
    let mut current_str = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !current_str.is_empty() {
                parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
                current_str.clear();
            }
            current_num.push(c);
        } else {
            if !current_num.is_empty() {
                parts.push(NaturalSortPart::num(&current_num));
                current_num.clear();
            }
            current_str.push(c);
        }
    }

    if !current_num.is_empty() {
        parts.push(NaturalSortPart::num(&current_num));
    }
    if !current_str.is_empty() {
        parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
    }

    parts
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalSortPart {
    Num(u64),
    Str(String),
}

impl NaturalSortPart {
    fn num(digits: &str) -> Self {
        // Digit runs too long for u64 still sort after every shorter number
        digits
            .parse::<u64>()
            .map(NaturalSortPart::Num)
            .unwrap_or(NaturalSortPart::Num(u64::MAX))
    }
}
