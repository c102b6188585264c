//! Application configuration

use crate::command::CommandId;
use crate::presentation::{DisplayLimits, DisplaySettings, ResamplingMode};
use crate::AppError;
use app_fs::ListOrder;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// How many parent folders `recent_folders` remembers
const MAX_RECENT_FOLDERS: usize = 10;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewer: ViewerConfig,
    pub browser: BrowserConfig,
    pub labels: LabelsConfig,
    pub keybindings: HashMap<String, Vec<String>>,
    pub recent_folders: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            viewer: ViewerConfig::default(),
            browser: BrowserConfig::default(),
            labels: LabelsConfig::default(),
            keybindings: default_keybindings(),
            recent_folders: Vec::new(),
        }
    }
}

/// Initial display settings and display ceilings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub max_display_width: u32,
    pub max_display_height: u32,
    pub resampling: ResamplingMode,
    /// Starting contrast factor, clamped into 0.5..=2.0
    pub contrast: f32,
    /// Increment used by the contrast up/down commands
    pub contrast_step: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_display_width: crate::presentation::MAX_DISPLAY_WIDTH,
            max_display_height: crate::presentation::MAX_DISPLAY_HEIGHT,
            resampling: ResamplingMode::HighQuality,
            contrast: 1.0,
            contrast_step: 0.1,
        }
    }
}

impl ViewerConfig {
    pub fn limits(&self) -> DisplayLimits {
        DisplayLimits {
            max_width: self.max_display_width,
            max_height: self.max_display_height,
        }
    }

    pub fn initial_settings(&self) -> DisplaySettings {
        DisplaySettings::new(self.resampling, self.contrast)
    }
}

/// Folder and image discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// `natural` sorts names; `filesystem` keeps enumeration order
    pub list_order: ListOrder,
    pub image_extensions: Vec<String>,
    /// Include dot-folders as entities
    pub show_hidden: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            list_order: ListOrder::Natural,
            image_extensions: app_fs::DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            show_hidden: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    /// Label table file name, created inside the parent folder
    pub table_file_name: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            table_file_name: app_db::DEFAULT_TABLE_FILE_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or defaults if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)
                .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
            tracing::info!("Configuration loaded from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "BatchLabeler", "BatchLabeler")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Move `folder` to the front of the recent list
    pub fn remember_folder(&mut self, folder: &Path) {
        let entry = folder.display().to_string();
        self.recent_folders.retain(|f| f != &entry);
        self.recent_folders.insert(0, entry);
        self.recent_folders.truncate(MAX_RECENT_FOLDERS);
    }
}

fn default_keybindings() -> HashMap<String, Vec<String>> {
    let mut kb = HashMap::new();

    // Parent folder
    kb.insert(CommandId::PARENT_LOAD.into(), vec!["open".into(), "o".into()]);
    kb.insert(CommandId::PARENT_RELOAD.into(), vec!["reload".into()]);

    // Entity folders
    kb.insert(CommandId::ENTITY_NEXT.into(), vec!["next_car".into(), "nc".into()]);
    kb.insert(CommandId::ENTITY_PREV.into(), vec!["prev_car".into(), "pc".into()]);

    // Images
    kb.insert(CommandId::IMAGE_NEXT.into(), vec!["next".into(), "n".into()]);
    kb.insert(CommandId::IMAGE_PREV.into(), vec!["prev".into(), "p".into()]);

    // Labeling
    kb.insert(CommandId::LABEL_COMMIT.into(), vec!["label".into(), "l".into()]);

    // View
    kb.insert(CommandId::VIEW_TOGGLE_RESAMPLING.into(), vec!["aliasing".into(), "a".into()]);
    kb.insert(CommandId::VIEW_SET_RESAMPLING.into(), vec!["filter".into()]);
    kb.insert(CommandId::VIEW_SET_CONTRAST.into(), vec!["contrast".into(), "c".into()]);
    kb.insert(CommandId::VIEW_CONTRAST_UP.into(), vec!["+".into()]);
    kb.insert(CommandId::VIEW_CONTRAST_DOWN.into(), vec!["-".into()]);
    kb.insert(CommandId::VIEW_RESIZE.into(), vec!["viewport".into(), "size".into()]);

    // App
    kb.insert(CommandId::APP_STATUS.into(), vec!["status".into(), "s".into()]);
    kb.insert(CommandId::APP_HELP.into(), vec!["help".into(), "?".into()]);
    kb.insert(CommandId::APP_QUIT.into(), vec!["quit".into(), "q".into()]);

    kb
}
