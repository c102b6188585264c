//! Batch Labeler Core Domain Logic
//!
//! This crate contains:
//! - Session state (entity and image traversal)
//! - Command system
//! - Configuration
//! - Error types
//! - Image loading and the presentation pipeline
//! - Label commit (folder rename + label table upsert)

pub mod state;
pub mod config;
pub mod command;
pub mod error;
pub mod navigation;
pub mod image_loader;
pub mod presentation;
pub mod labeling;

pub use state::Session;
pub use config::{AppConfig, ViewerConfig, BrowserConfig, LabelsConfig};
pub use command::{Command, CommandId, Outcome, EntityView};
pub use error::{AppError, Edge, Level};
pub use navigation::{Cursor, EntityList, ImageSet};
pub use image_loader::load_image;
pub use presentation::{
    DisplayLimits, DisplaySettings, Frame, ResamplingMode, Viewport,
    adjust_contrast, fit_dimensions, render, render_file,
    MAX_DISPLAY_WIDTH, MAX_DISPLAY_HEIGHT, MIN_CONTRAST, MAX_CONTRAST,
};
pub use labeling::{CommitReport, RenameOutcome, canonical_folder_name, id_part, ID_SEPARATOR};
