//! Two-level traversal: entity folders under a parent, images inside a folder

use crate::error::{Edge, Level};
use crate::AppError;
use app_fs::ListOrder;
use std::path::{Path, PathBuf};

/// Index into a sequence of known length. Never wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn at_first(&self) -> bool {
        self.index == 0
    }

    pub fn at_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    /// Index the next move would land on, if any
    pub fn peek_next(&self) -> Option<usize> {
        (!self.at_last()).then(|| self.index + 1)
    }

    /// Index the previous move would land on, if any
    pub fn peek_prev(&self) -> Option<usize> {
        (!self.at_first()).then(|| self.index - 1)
    }

    /// Move to next item
    pub fn next(&mut self) -> bool {
        match self.peek_next() {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    /// Move to previous item
    pub fn prev(&mut self) -> bool {
        match self.peek_prev() {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    /// Human-readable 1-based position, "3/10"
    pub fn position(&self) -> String {
        if self.len == 0 {
            "0/0".to_string()
        } else {
            format!("{}/{}", self.index + 1, self.len)
        }
    }

    fn set(&mut self, index: usize) {
        self.index = index.min(self.len.saturating_sub(1));
    }
}

/// Entity folders discovered under a parent directory.
///
/// The name list is a snapshot taken at load time; folders created or removed
/// by other programs show up only after [`EntityList::load`] runs again.
#[derive(Debug, Clone)]
pub struct EntityList {
    parent: PathBuf,
    names: Vec<String>,
    cursor: Cursor,
}

impl EntityList {
    /// List the immediate subdirectories of `parent`
    pub fn load(parent: &Path, order: ListOrder, show_hidden: bool) -> Result<Self, AppError> {
        let options = app_fs::ListOptions {
            show_hidden,
            ..app_fs::ListOptions::directories_only(order)
        };
        let names: Vec<String> = app_fs::list_directory(parent, &options)?
            .into_iter()
            .map(|e| e.name)
            .collect();

        if names.is_empty() {
            return Err(AppError::NoSubfoldersFound(parent.to_path_buf()));
        }

        tracing::info!("Found {} entity folders in {}", names.len(), parent.display());
        Ok(Self {
            parent: parent.to_path_buf(),
            cursor: Cursor::new(names.len()),
            names,
        })
    }

    pub fn parent(&self) -> &Path {
        &self.parent
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn current_name(&self) -> &str {
        &self.names[self.cursor.index()]
    }

    /// Path of the selected entity folder, under its latest known name
    pub fn current_folder(&self) -> PathBuf {
        self.parent.join(self.current_name())
    }

    /// Folder the next move would select, or the boundary that blocks it
    pub fn peek(&self, edge: Edge) -> Result<(usize, PathBuf), AppError> {
        let target = match edge {
            Edge::Last => self.cursor.peek_next(),
            Edge::First => self.cursor.peek_prev(),
        };
        target
            .map(|index| (index, self.parent.join(&self.names[index])))
            .ok_or(AppError::AtBoundary { level: Level::Entity, edge })
    }

    /// Select an index previously returned by [`EntityList::peek`]
    pub fn select(&mut self, index: usize) {
        self.cursor.set(index);
    }

    /// Record that the selected folder now lives under `new_name`
    pub fn rename_current(&mut self, new_name: &str) {
        let index = self.cursor.index();
        self.names[index] = new_name.to_string();
    }
}

/// Image files of one entity folder, with the image cursor
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    names: Vec<String>,
    cursor: Cursor,
}

impl ImageSet {
    /// Scan `folder` for files with one of `extensions`. Cursor starts at 0.
    pub fn scan<S: AsRef<str>>(folder: &Path, extensions: &[S], order: ListOrder) -> Result<Self, AppError> {
        let names = app_fs::list_images(folder, extensions, order)?;
        tracing::debug!("{} images in {}", names.len(), folder.display());
        Ok(Self::from_names(names))
    }

    pub fn from_names(names: Vec<String>) -> Self {
        Self {
            cursor: Cursor::new(names.len()),
            names,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn current(&self) -> Option<&str> {
        self.names.get(self.cursor.index()).map(String::as_str)
    }

    pub fn next(&mut self) -> Result<&str, AppError> {
        if !self.cursor.next() {
            return Err(AppError::AtBoundary { level: Level::Image, edge: Edge::Last });
        }
        Ok(&self.names[self.cursor.index()])
    }

    pub fn prev(&mut self) -> Result<&str, AppError> {
        if !self.cursor.prev() {
            return Err(AppError::AtBoundary { level: Level::Image, edge: Edge::First });
        }
        Ok(&self.names[self.cursor.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_cursor_never_leaves_range() {
        for len in 0..5 {
            let mut cursor = Cursor::new(len);
            // Alternate bursts of moves in both directions
            for step in 0..40 {
                if (step / 7) % 2 == 0 {
                    cursor.next();
                } else {
                    cursor.prev();
                }
                assert!(cursor.index() < len.max(1));
            }
        }
    }

    #[test]
    fn test_cursor_boundaries_are_noops() {
        let mut cursor = Cursor::new(2);
        assert!(!cursor.prev());
        assert_eq!(cursor.index(), 0);
        assert!(cursor.next());
        assert!(!cursor.next());
        assert_eq!(cursor.index(), 1);
        assert_eq!(cursor.position(), "2/2");
    }

    #[test]
    fn test_empty_cursor() {
        let mut cursor = Cursor::new(0);
        assert!(cursor.is_empty());
        assert!(!cursor.next());
        assert!(!cursor.prev());
        assert_eq!(cursor.position(), "0/0");
    }

    #[test]
    fn test_entity_list_requires_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("labels.csv"), "ID,LABEL\n").unwrap();

        let result = EntityList::load(dir.path(), ListOrder::Natural, true);
        assert!(matches!(result, Err(AppError::NoSubfoldersFound(_))));
    }

    #[test]
    fn test_entity_list_peek_select_and_rename() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["1", "2_van"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let mut list = EntityList::load(dir.path(), ListOrder::Natural, true).unwrap();
        assert_eq!(list.current_name(), "1");
        assert!(matches!(
            list.peek(Edge::First),
            Err(AppError::AtBoundary { level: Level::Entity, edge: Edge::First })
        ));

        let (index, folder) = list.peek(Edge::Last).unwrap();
        assert_eq!(folder, dir.path().join("2_van"));
        list.select(index);
        list.rename_current("2_suv");
        assert_eq!(list.current_folder(), dir.path().join("2_suv"));
        assert_eq!(list.names(), ["1", "2_suv"]);
    }

    #[test]
    fn test_image_set_navigation() {
        let mut set = ImageSet::from_names(vec!["a.jpg".into(), "b.png".into()]);
        assert_eq!(set.current(), Some("a.jpg"));
        assert!(matches!(
            set.prev(),
            Err(AppError::AtBoundary { level: Level::Image, edge: Edge::First })
        ));
        assert_eq!(set.next().unwrap(), "b.png");
        assert!(matches!(
            set.next(),
            Err(AppError::AtBoundary { level: Level::Image, edge: Edge::Last })
        ));
        assert_eq!(set.cursor().index(), 1);
    }

    #[test]
    fn test_empty_image_set() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let set = ImageSet::scan(dir.path(), app_fs::DEFAULT_IMAGE_EXTENSIONS, ListOrder::Natural).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.current(), None);
    }
}
