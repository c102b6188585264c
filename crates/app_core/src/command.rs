//! Command system for user actions

use crate::labeling::{CommitReport, RenameOutcome};
use crate::presentation::{ResamplingMode, Viewport};
use std::path::PathBuf;

/// Command identifiers, used as keys of the keybinding table
pub struct CommandId;

impl CommandId {
    // Parent folder
    pub const PARENT_LOAD: &'static str = "parent.load";
    pub const PARENT_RELOAD: &'static str = "parent.reload";

    // Entity traversal
    pub const ENTITY_NEXT: &'static str = "entity.next";
    pub const ENTITY_PREV: &'static str = "entity.prev";

    // Image traversal
    pub const IMAGE_NEXT: &'static str = "image.next";
    pub const IMAGE_PREV: &'static str = "image.prev";

    // Labeling
    pub const LABEL_COMMIT: &'static str = "label.commit";

    // View
    pub const VIEW_TOGGLE_RESAMPLING: &'static str = "view.toggle_resampling";
    pub const VIEW_SET_RESAMPLING: &'static str = "view.set_resampling";
    pub const VIEW_SET_CONTRAST: &'static str = "view.set_contrast";
    pub const VIEW_CONTRAST_UP: &'static str = "view.contrast_up";
    pub const VIEW_CONTRAST_DOWN: &'static str = "view.contrast_down";
    pub const VIEW_RESIZE: &'static str = "view.resize";

    // App (handled by the front end, never reach the session)
    pub const APP_STATUS: &'static str = "app.status";
    pub const APP_HELP: &'static str = "app.help";
    pub const APP_QUIT: &'static str = "app.quit";
}

/// A user action the session can execute
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadParent(PathBuf),
    ReloadParent,
    NextEntity,
    PreviousEntity,
    NextImage,
    PreviousImage,
    CommitLabel(String),
    ToggleResampling,
    SetResampling(ResamplingMode),
    SetContrast(f32),
    IncreaseContrast,
    DecreaseContrast,
    ResizeViewport(Viewport),
}

impl Command {
    /// Build a command from its id and the rest of the input line.
    /// Returns `None` for unknown ids and unparsable arguments.
    pub fn from_id(id: &str, arg: &str) -> Option<Self> {
        let arg = arg.trim();
        let command = match id {
            CommandId::PARENT_LOAD if !arg.is_empty() => Command::LoadParent(PathBuf::from(arg)),
            CommandId::PARENT_RELOAD => Command::ReloadParent,
            CommandId::ENTITY_NEXT => Command::NextEntity,
            CommandId::ENTITY_PREV => Command::PreviousEntity,
            CommandId::IMAGE_NEXT => Command::NextImage,
            CommandId::IMAGE_PREV => Command::PreviousImage,
            // Empty text is passed through so the commit can report it
            CommandId::LABEL_COMMIT => Command::CommitLabel(arg.to_string()),
            CommandId::VIEW_TOGGLE_RESAMPLING => Command::ToggleResampling,
            CommandId::VIEW_SET_RESAMPLING => Command::SetResampling(ResamplingMode::parse(arg)?),
            CommandId::VIEW_SET_CONTRAST => Command::SetContrast(arg.parse().ok()?),
            CommandId::VIEW_CONTRAST_UP => Command::IncreaseContrast,
            CommandId::VIEW_CONTRAST_DOWN => Command::DecreaseContrast,
            CommandId::VIEW_RESIZE => Command::ResizeViewport(Viewport::parse(arg)?),
            _ => return None,
        };
        Some(command)
    }

    pub fn id(&self) -> &'static str {
        match self {
            Command::LoadParent(_) => CommandId::PARENT_LOAD,
            Command::ReloadParent => CommandId::PARENT_RELOAD,
            Command::NextEntity => CommandId::ENTITY_NEXT,
            Command::PreviousEntity => CommandId::ENTITY_PREV,
            Command::NextImage => CommandId::IMAGE_NEXT,
            Command::PreviousImage => CommandId::IMAGE_PREV,
            Command::CommitLabel(_) => CommandId::LABEL_COMMIT,
            Command::ToggleResampling => CommandId::VIEW_TOGGLE_RESAMPLING,
            Command::SetResampling(_) => CommandId::VIEW_SET_RESAMPLING,
            Command::SetContrast(_) => CommandId::VIEW_SET_CONTRAST,
            Command::IncreaseContrast => CommandId::VIEW_CONTRAST_UP,
            Command::DecreaseContrast => CommandId::VIEW_CONTRAST_DOWN,
            Command::ResizeViewport(_) => CommandId::VIEW_RESIZE,
        }
    }
}

/// Snapshot of the selected entity folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityView {
    pub index: usize,
    pub count: usize,
    pub name: String,
    pub folder: PathBuf,
    pub image_count: usize,
}

impl EntityView {
    pub fn status(&self) -> String {
        let images = match self.image_count {
            0 => "No images in this folder.".to_string(),
            1 => "1 image".to_string(),
            n => format!("{} images", n),
        };
        format!(
            "Current Car: {} ({}/{}) - {}",
            self.name,
            self.index + 1,
            self.count,
            images
        )
    }
}

/// What a successfully executed command changed
#[derive(Debug, Clone)]
pub enum Outcome {
    ParentLoaded { parent: PathBuf, entity: EntityView },
    EntityChanged(EntityView),
    ImageChanged { position: String, file: String },
    ResamplingChanged(ResamplingMode),
    ContrastChanged(f32),
    ViewportChanged(Viewport),
    LabelCommitted(CommitReport),
}

impl Outcome {
    /// Whether the displayed frame has to be recomputed
    pub fn needs_redraw(&self) -> bool {
        !matches!(self, Outcome::LabelCommitted(_))
    }

    /// One-line status text for the front end
    pub fn status(&self) -> String {
        match self {
            Outcome::ParentLoaded { parent, entity } => {
                format!("Loaded {} | {}", parent.display(), entity.status())
            }
            Outcome::EntityChanged(entity) => entity.status(),
            Outcome::ImageChanged { position, file } => format!("Image {}: {}", position, file),
            Outcome::ResamplingChanged(mode) => format!("Resampling: {}", mode.as_str()),
            Outcome::ContrastChanged(factor) => format!("Contrast: {:.1}", factor),
            Outcome::ViewportChanged(v) => format!("Viewport: {}x{}", v.width, v.height),
            Outcome::LabelCommitted(report) => {
                let rename = match report.rename {
                    RenameOutcome::Renamed => format!("Renamed folder to: {}", report.folder_name),
                    RenameOutcome::NoRenameNeeded => {
                        "Folder name already matches the label format.".to_string()
                    }
                };
                format!("{} | Label updated in {}", rename, report.table_path.display())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_parses_arguments() {
        assert_eq!(
            Command::from_id(CommandId::VIEW_SET_CONTRAST, " 1.5 "),
            Some(Command::SetContrast(1.5))
        );
        assert_eq!(
            Command::from_id(CommandId::VIEW_RESIZE, "640x480"),
            Some(Command::ResizeViewport(Viewport::new(640, 480)))
        );
        assert_eq!(
            Command::from_id(CommandId::VIEW_SET_RESAMPLING, "nearest"),
            Some(Command::SetResampling(ResamplingMode::Nearest))
        );
        assert_eq!(
            Command::from_id(CommandId::LABEL_COMMIT, "red sedan"),
            Some(Command::CommitLabel("red sedan".into()))
        );
    }

    #[test]
    fn test_from_id_rejects_bad_input() {
        assert_eq!(Command::from_id(CommandId::VIEW_SET_CONTRAST, "high"), None);
        assert_eq!(Command::from_id(CommandId::PARENT_LOAD, ""), None);
        assert_eq!(Command::from_id(CommandId::APP_QUIT, ""), None);
        assert_eq!(Command::from_id("nav.unknown", ""), None);
    }

    #[test]
    fn test_id_round_trips_for_argless_commands() {
        for command in [Command::NextEntity, Command::PreviousImage, Command::ToggleResampling] {
            assert_eq!(Command::from_id(command.id(), ""), Some(command.clone()));
        }
    }

    #[test]
    fn test_entity_status_mentions_empty_folder() {
        let view = EntityView {
            index: 0,
            count: 3,
            name: "42".into(),
            folder: PathBuf::from("/p/42"),
            image_count: 0,
        };
        assert_eq!(view.status(), "Current Car: 42 (1/3) - No images in this folder.");
    }
}
