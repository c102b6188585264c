//! Session state: parent selection, cursors, display settings

use crate::command::{Command, EntityView, Outcome};
use crate::error::Edge;
use crate::labeling::{self, CommitReport};
use crate::navigation::{EntityList, ImageSet};
use crate::presentation::{self, DisplaySettings, Frame, Viewport};
use crate::{AppConfig, AppError};
use app_fs::{DefaultFileOperations, FileOperations};
use std::path::{Path, PathBuf};

/// Everything one labeling session knows.
///
/// All operations are synchronous and run to completion. Failed operations
/// leave the session as it was, except for the documented label commit case
/// where the folder rename succeeded and the table write did not.
pub struct Session {
    config: AppConfig,
    settings: DisplaySettings,
    viewport: Viewport,
    entities: Option<EntityList>,
    images: ImageSet,
    file_ops: Box<dyn FileOperations>,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self::with_file_operations(config, Box::new(DefaultFileOperations::new()))
    }

    pub fn with_file_operations(config: AppConfig, file_ops: Box<dyn FileOperations>) -> Self {
        let settings = config.viewer.initial_settings();
        Self {
            config,
            settings,
            viewport: Viewport::default(),
            entities: None,
            images: ImageSet::default(),
            file_ops,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn entities(&self) -> Option<&EntityList> {
        self.entities.as_ref()
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    /// Execute a command and report what changed
    pub fn execute(&mut self, command: Command) -> Result<Outcome, AppError> {
        tracing::debug!("Executing {}", command.id());

        let result = match command {
            Command::LoadParent(path) => self.load_parent(&path),
            Command::ReloadParent => self.reload_parent(),
            Command::NextEntity => self.next_entity().map(Outcome::EntityChanged),
            Command::PreviousEntity => self.previous_entity().map(Outcome::EntityChanged),
            Command::NextImage => self.next_image(),
            Command::PreviousImage => self.previous_image(),
            Command::CommitLabel(text) => self.commit_label(&text).map(Outcome::LabelCommitted),
            Command::ToggleResampling => {
                Ok(Outcome::ResamplingChanged(self.settings.toggle_resampling()))
            }
            Command::SetResampling(mode) => {
                self.settings.resampling = mode;
                Ok(Outcome::ResamplingChanged(mode))
            }
            Command::SetContrast(factor) => {
                Ok(Outcome::ContrastChanged(self.settings.set_contrast(factor)))
            }
            Command::IncreaseContrast => {
                let step = self.config.viewer.contrast_step;
                Ok(Outcome::ContrastChanged(self.settings.step_contrast(step)))
            }
            Command::DecreaseContrast => {
                let step = self.config.viewer.contrast_step;
                Ok(Outcome::ContrastChanged(self.settings.step_contrast(-step)))
            }
            Command::ResizeViewport(viewport) => {
                self.set_viewport(viewport);
                Ok(Outcome::ViewportChanged(viewport))
            }
        };

        if let Err(ref e) = result {
            tracing::warn!("{}", e);
        }
        result
    }

    // ===== Entity traversal =====

    /// Discover entity folders under `path` and select the first one.
    /// On failure the previous parent (if any) stays loaded.
    pub fn load_parent(&mut self, path: &Path) -> Result<Outcome, AppError> {
        let browser = &self.config.browser;
        let entities = EntityList::load(path, browser.list_order, browser.show_hidden)?;
        let images = self.scan(&entities.current_folder())?;

        self.entities = Some(entities);
        self.images = images;

        tracing::info!("Parent folder loaded: {}", path.display());
        Ok(Outcome::ParentLoaded {
            parent: path.to_path_buf(),
            entity: self.entity_view()?,
        })
    }

    /// Re-discover folders of the current parent, picking up external changes
    pub fn reload_parent(&mut self) -> Result<Outcome, AppError> {
        let parent = self.parent()?.to_path_buf();
        self.load_parent(&parent)
    }

    pub fn next_entity(&mut self) -> Result<EntityView, AppError> {
        self.move_entity(Edge::Last)
    }

    pub fn previous_entity(&mut self) -> Result<EntityView, AppError> {
        self.move_entity(Edge::First)
    }

    fn move_entity(&mut self, edge: Edge) -> Result<EntityView, AppError> {
        let entities = self.entities.as_ref().ok_or(AppError::NoParentLoaded)?;
        let (index, folder) = entities.peek(edge)?;
        // Scan before moving so a vanished folder leaves the cursor alone
        let images = self.scan(&folder)?;

        if let Some(entities) = self.entities.as_mut() {
            entities.select(index);
        }
        self.images = images;
        self.entity_view()
    }

    /// Path of the selected entity folder under its latest name
    pub fn current_entity_folder(&self) -> Option<PathBuf> {
        self.entities.as_ref().map(EntityList::current_folder)
    }

    pub fn parent(&self) -> Result<&Path, AppError> {
        self.entities
            .as_ref()
            .map(EntityList::parent)
            .ok_or(AppError::NoParentLoaded)
    }

    pub fn entity_view(&self) -> Result<EntityView, AppError> {
        let entities = self.entities.as_ref().ok_or(AppError::NoParentLoaded)?;
        let cursor = entities.cursor();
        Ok(EntityView {
            index: cursor.index(),
            count: cursor.len(),
            name: entities.current_name().to_string(),
            folder: entities.current_folder(),
            image_count: self.images.len(),
        })
    }

    // ===== Image traversal & presentation =====

    fn scan(&self, folder: &Path) -> Result<ImageSet, AppError> {
        let browser = &self.config.browser;
        ImageSet::scan(folder, &browser.image_extensions, browser.list_order)
    }

    /// Rescan the selected entity folder; the image cursor returns to 0
    pub fn load_images(&mut self) -> Result<usize, AppError> {
        let folder = self.current_entity_folder().ok_or(AppError::NoParentLoaded)?;
        self.images = self.scan(&folder)?;
        if self.images.is_empty() {
            return Err(AppError::NoImagesInFolder(folder));
        }
        Ok(self.images.len())
    }

    pub fn next_image(&mut self) -> Result<Outcome, AppError> {
        let file = self.images.next()?.to_string();
        Ok(self.image_changed(file))
    }

    pub fn previous_image(&mut self) -> Result<Outcome, AppError> {
        let file = self.images.prev()?.to_string();
        Ok(self.image_changed(file))
    }

    fn image_changed(&self, file: String) -> Outcome {
        Outcome::ImageChanged {
            position: self.images.cursor().position(),
            file,
        }
    }

    /// Path of the selected image, if the folder has any
    pub fn current_image_path(&self) -> Option<PathBuf> {
        let folder = self.current_entity_folder()?;
        self.images.current().map(|name| folder.join(name))
    }

    /// Render the selected image for the session's viewport
    pub fn render_current(&self) -> Result<Frame, AppError> {
        self.render_current_image(self.viewport)
    }

    /// Render the selected image for `viewport` with the current settings.
    /// Reads the file only; the cursor does not move on failure.
    pub fn render_current_image(&self, viewport: Viewport) -> Result<Frame, AppError> {
        let folder = self.current_entity_folder().ok_or(AppError::NoParentLoaded)?;
        let name = self
            .images
            .current()
            .ok_or_else(|| AppError::NoImagesInFolder(folder.clone()))?;

        presentation::render_file(
            &folder.join(name),
            viewport,
            self.config.viewer.limits(),
            &self.settings,
        )
    }

    /// Change the display area used by [`Session::render_current`]
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // ===== Label commit =====

    /// Rename the selected folder for `raw_label` and record the label
    pub fn commit_label(&mut self, raw_label: &str) -> Result<CommitReport, AppError> {
        let entities = self.entities.as_mut().ok_or(AppError::NoParentLoaded)?;
        labeling::commit_label(
            entities,
            raw_label,
            &self.config.labels.table_file_name,
            self.file_ops.as_ref(),
        )
    }

    /// Header line for the front end
    pub fn status_line(&self) -> String {
        let entity = match self.entity_view() {
            Ok(view) => view.status(),
            Err(_) => return "No car folder loaded".to_string(),
        };
        let image = match self.images.current() {
            Some(name) => format!("image {} {}", self.images.cursor().position(), name),
            None => "no image".to_string(),
        };
        format!(
            "{} | {} | {} contrast {:.1}",
            entity,
            image,
            self.settings.resampling.as_str(),
            self.settings.contrast()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Level};
    use app_fs::ListOrder;
    use image::{Rgb, RgbImage};
    use std::fs;

    fn write_image(path: &Path, width: u32, height: u32) {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]))
            .save(path)
            .unwrap();
    }

    /// parent/{1: a.png b.PNG notes.txt, 2_van: (empty), 3: c.png}
    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        for name in ["1", "2_van", "3"] {
            fs::create_dir(p.join(name)).unwrap();
        }
        write_image(&p.join("1").join("a.png"), 160, 120);
        write_image(&p.join("1").join("b.PNG"), 40, 80);
        fs::write(p.join("1").join("notes.txt"), b"x").unwrap();
        write_image(&p.join("3").join("c.png"), 20, 20);
        dir
    }

    fn session() -> Session {
        let mut config = AppConfig::default();
        config.browser.list_order = ListOrder::Natural;
        Session::new(config)
    }

    #[test]
    fn test_load_parent_selects_first_entity() {
        let dir = fixture();
        let mut s = session();

        let outcome = s.execute(Command::LoadParent(dir.path().to_path_buf())).unwrap();
        match outcome {
            Outcome::ParentLoaded { entity, .. } => {
                assert_eq!(entity.name, "1");
                assert_eq!(entity.count, 3);
                assert_eq!(entity.image_count, 2);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(s.images().names(), ["a.png", "b.PNG"]);
        assert_eq!(s.current_entity_folder(), Some(dir.path().join("1")));
    }

    #[test]
    fn test_load_parent_without_subfolders_keeps_previous() {
        let dir = fixture();
        let empty = tempfile::tempdir().unwrap();
        let mut s = session();
        s.load_parent(dir.path()).unwrap();

        let result = s.load_parent(empty.path());
        assert!(matches!(result, Err(AppError::NoSubfoldersFound(_))));
        assert_eq!(s.parent().unwrap(), dir.path());
    }

    #[test]
    fn test_navigation_before_load() {
        let mut s = session();
        assert!(matches!(s.execute(Command::NextEntity), Err(AppError::NoParentLoaded)));
        assert!(matches!(s.execute(Command::NextImage), Err(AppError::AtBoundary { .. })));
        assert_eq!(s.status_line(), "No car folder loaded");
    }

    #[test]
    fn test_entity_boundaries() {
        let dir = fixture();
        let mut s = session();
        s.load_parent(dir.path()).unwrap();

        assert!(matches!(
            s.previous_entity(),
            Err(AppError::AtBoundary { level: Level::Entity, edge: Edge::First })
        ));
        assert_eq!(s.next_entity().unwrap().name, "2_van");
        assert_eq!(s.next_entity().unwrap().name, "3");
        assert!(matches!(
            s.next_entity(),
            Err(AppError::AtBoundary { level: Level::Entity, edge: Edge::Last })
        ));
        assert_eq!(s.entity_view().unwrap().index, 2);
    }

    #[test]
    fn test_entity_change_resets_image_cursor() {
        let dir = fixture();
        let mut s = session();
        s.load_parent(dir.path()).unwrap();
        s.next_image().unwrap();
        assert_eq!(s.images().cursor().index(), 1);

        s.next_entity().unwrap();
        s.previous_entity().unwrap();
        assert_eq!(s.images().cursor().index(), 0);
    }

    #[test]
    fn test_empty_entity_folder_renders_placeholder_error() {
        let dir = fixture();
        let mut s = session();
        s.load_parent(dir.path()).unwrap();

        let view = s.next_entity().unwrap();
        assert_eq!(view.image_count, 0);
        assert!(matches!(s.render_current(), Err(AppError::NoImagesInFolder(_))));
        assert!(matches!(s.load_images(), Err(AppError::NoImagesInFolder(_))));
        assert!(matches!(s.next_image(), Err(AppError::AtBoundary { .. })));
    }

    #[test]
    fn test_vanished_folder_does_not_move_cursor() {
        let dir = fixture();
        let mut s = session();
        s.load_parent(dir.path()).unwrap();
        fs::remove_dir_all(dir.path().join("2_van")).unwrap();

        assert!(matches!(s.next_entity(), Err(AppError::FolderNotFound(_))));
        assert_eq!(s.entity_view().unwrap().name, "1");
        assert_eq!(s.images().len(), 2);
    }

    #[test]
    fn test_render_fits_viewport_and_follows_settings() {
        let dir = fixture();
        let mut s = session();
        s.load_parent(dir.path()).unwrap();

        s.execute(Command::ResizeViewport(Viewport::new(80, 80))).unwrap();
        let frame = s.render_current().unwrap();
        assert_eq!((frame.width(), frame.height()), (80, 60));
        assert_eq!(frame.original_size, (160, 120));

        // Switching filter and contrast keeps the geometry
        s.execute(Command::ToggleResampling).unwrap();
        s.execute(Command::SetContrast(1.8)).unwrap();
        let adjusted = s.render_current().unwrap();
        assert_eq!((adjusted.width(), adjusted.height()), (80, 60));
        assert_ne!(adjusted.pixels(), frame.pixels());

        // Rendering never touches the source
        let before = fs::read(dir.path().join("1").join("a.png")).unwrap();
        s.render_current().unwrap();
        assert_eq!(fs::read(dir.path().join("1").join("a.png")).unwrap(), before);
    }

    #[test]
    fn test_decode_error_keeps_cursor() {
        let dir = fixture();
        fs::write(dir.path().join("3").join("d.png"), b"garbage").unwrap();
        let mut s = session();
        s.load_parent(dir.path()).unwrap();
        s.next_entity().unwrap();
        s.next_entity().unwrap();
        s.next_image().unwrap();

        match s.render_current() {
            Err(AppError::DecodeError { file, .. }) => assert_eq!(file, "d.png"),
            other => panic!("expected DecodeError, got {:?}", other.map(|f| f.source)),
        }
        assert_eq!(s.images().current(), Some("d.png"));
    }

    #[test]
    fn test_commit_updates_current_folder_and_keeps_images() {
        let dir = fixture();
        let mut s = session();
        s.load_parent(dir.path()).unwrap();
        s.next_image().unwrap();

        let outcome = s.execute(Command::CommitLabel("sedan".into())).unwrap();
        assert!(!outcome.needs_redraw());
        assert_eq!(s.current_entity_folder(), Some(dir.path().join("1_sedan")));
        assert_eq!(s.images().cursor().index(), 1);
        assert_eq!(
            s.current_image_path(),
            Some(dir.path().join("1_sedan").join("b.PNG"))
        );
        assert!(s.render_current().is_ok());
        assert!(s.status_line().starts_with("Current Car: 1_sedan"));
    }

    #[test]
    fn test_commit_collision_keeps_state() {
        let dir = fixture();
        fs::create_dir(dir.path().join("1_sedan")).unwrap();
        let mut s = session();
        s.load_parent(dir.path()).unwrap();
        assert_eq!(s.entity_view().unwrap().name, "1");

        let result = s.execute(Command::CommitLabel("sedan".into()));
        assert!(matches!(result, Err(AppError::RenameFailed { .. })));
        assert_eq!(s.current_entity_folder(), Some(dir.path().join("1")));
        assert_eq!(s.images().names(), ["a.png", "b.PNG"]);
        assert!(!dir.path().join("labels.csv").exists());
    }

    #[test]
    fn test_reload_picks_up_new_folders() {
        let dir = fixture();
        let mut s = session();
        s.load_parent(dir.path()).unwrap();
        fs::create_dir(dir.path().join("4")).unwrap();

        s.execute(Command::ReloadParent).unwrap();
        assert_eq!(s.entity_view().unwrap().count, 4);
    }

    #[test]
    fn test_contrast_commands_stay_in_range() {
        let mut s = session();
        for _ in 0..30 {
            s.execute(Command::IncreaseContrast).unwrap();
        }
        assert_eq!(s.settings().contrast(), 2.0);
        for _ in 0..30 {
            s.execute(Command::DecreaseContrast).unwrap();
        }
        assert_eq!(s.settings().contrast(), 0.5);
    }
}
