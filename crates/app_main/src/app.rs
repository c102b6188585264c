//! Application main loop

use crate::input::{Input, InputMap};
use anyhow::{Context, Result};
use app_core::{AppConfig, AppError, Command, Outcome, Session, Viewport};
use image::ImageFormat;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Line-oriented front end around a [`Session`]
pub struct App {
    session: Session,
    input: InputMap,
    /// Persisted settings; only `recent_folders` changes at runtime
    config: AppConfig,
    config_path: PathBuf,
    preview: PathBuf,
}

impl App {
    pub fn new(config: AppConfig, config_path: PathBuf, preview: PathBuf, viewport: Viewport) -> Self {
        let input = InputMap::new(&config.keybindings);
        let mut session = Session::new(config.clone());
        session.set_viewport(viewport);

        Self {
            session,
            input,
            config,
            config_path,
            preview,
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Load `parent` as if typed at the prompt
    pub fn open<W: Write>(&mut self, parent: PathBuf, out: &mut W) -> Result<()> {
        self.dispatch(Command::LoadParent(parent), out)
    }

    /// Read commands until end of input or quit
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(out, "{}", self.session.status_line())?;

        for line in input.lines() {
            let line = line.context("Cannot read input")?;

            match self.input.parse(&line) {
                Ok(None) => {}
                Ok(Some(Input::Quit)) => break,
                Ok(Some(Input::Status)) => writeln!(out, "{}", self.session.status_line())?,
                Ok(Some(Input::Help)) => {
                    for help in self.input.help_lines() {
                        writeln!(out, "{}", help)?;
                    }
                }
                Ok(Some(Input::Command(command))) => self.dispatch(command, out)?,
                Err(e) => writeln!(out, "{}", e)?,
            }
        }
        Ok(())
    }

    fn dispatch<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match self.session.execute(command) {
            Ok(outcome) => {
                writeln!(out, "{}", outcome.status())?;
                if let Outcome::ParentLoaded { parent, .. } = &outcome {
                    self.remember(parent.clone());
                }
                if outcome.needs_redraw() {
                    self.redraw(out)?;
                }
            }
            Err(e) => writeln!(out, "{}", e.user_message())?,
        }
        Ok(())
    }

    /// Render the current image to the preview file
    fn redraw<W: Write>(&mut self, out: &mut W) -> Result<()> {
        match self.session.render_current() {
            Ok(frame) => {
                frame
                    .image
                    .save_with_format(&self.preview, ImageFormat::Png)
                    .with_context(|| format!("Cannot write preview {}", self.preview.display()))?;
                writeln!(
                    out,
                    "Preview {}x{} (original {}x{}) -> {}",
                    frame.width(),
                    frame.height(),
                    frame.original_size.0,
                    frame.original_size.1,
                    self.preview.display()
                )?;
            }
            // Nothing selected yet; the status line already says so
            Err(AppError::NoParentLoaded) => {}
            Err(e) => writeln!(out, "{}", e.user_message())?,
        }
        Ok(())
    }

    fn remember(&mut self, parent: PathBuf) {
        self.config.remember_folder(&parent);
        if let Err(e) = self.config.save_to(&self.config_path) {
            tracing::warn!("Failed to save recent folders: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;
    use std::path::Path;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        /// cars/{7: a.png, 8_bus: (empty)} plus a config dir
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let cars = dir.path().join("cars");
            fs::create_dir_all(cars.join("7")).unwrap();
            fs::create_dir_all(cars.join("8_bus")).unwrap();
            RgbImage::from_pixel(200, 100, Rgb([10, 120, 200]))
                .save(cars.join("7").join("a.png"))
                .unwrap();
            Self { dir }
        }

        fn cars(&self) -> PathBuf {
            self.dir.path().join("cars")
        }

        fn preview(&self) -> PathBuf {
            self.dir.path().join("preview.png")
        }

        fn config_path(&self) -> PathBuf {
            self.dir.path().join("config").join("config.toml")
        }

        fn app(&self) -> App {
            App::new(
                AppConfig::default(),
                self.config_path(),
                self.preview(),
                Viewport::new(100, 100),
            )
        }
    }

    fn run(app: &mut App, script: &str) -> String {
        let mut out = Vec::new();
        app.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn image_size(path: &Path) -> (u32, u32) {
        image::image_dimensions(path).unwrap()
    }

    #[test]
    fn test_open_writes_preview_and_remembers_folder() {
        let fx = Fixture::new();
        let mut app = fx.app();

        let out = run(&mut app, &format!("open {}\nq\n", fx.cars().display()));
        assert!(out.contains("Current Car: 7 (1/2)"), "{}", out);
        assert_eq!(image_size(&fx.preview()), (100, 50));

        let saved = AppConfig::load_from(&fx.config_path()).unwrap();
        assert_eq!(saved.recent_folders, vec![fx.cars().display().to_string()]);
    }

    #[test]
    fn test_label_and_navigation_script() {
        let fx = Fixture::new();
        let mut app = fx.app();
        app.open(fx.cars(), &mut Vec::new()).unwrap();

        let out = run(&mut app, "label sedan\nnc\nnc\npc\nlabel\n");
        assert!(out.contains("Renamed folder to: 7_sedan"), "{}", out);
        assert!(out.contains("No images in this folder."), "{}", out);
        assert!(out.contains("No more folders."), "{}", out);
        assert!(out.contains("Please enter a label."), "{}", out);

        assert!(fx.cars().join("7_sedan").is_dir());
        let table = fs::read_to_string(fx.cars().join("labels.csv")).unwrap();
        assert_eq!(table, "ID,LABEL\r\n7,sedan\r\n");
    }

    #[test]
    fn test_view_commands_redraw() {
        let fx = Fixture::new();
        let mut app = fx.app();
        app.open(fx.cars(), &mut Vec::new()).unwrap();

        let out = run(&mut app, "size 40x40\na\n+\nbogus\n");
        assert!(out.contains("Viewport: 40x40"));
        assert!(out.contains("Resampling: nearest"));
        assert!(out.contains("Contrast: 1.1"));
        assert!(out.contains("Unknown command: bogus"));
        assert_eq!(image_size(&fx.preview()), (40, 20));
    }

    #[test]
    fn test_cli_viewport_applies_before_first_render() {
        let fx = Fixture::new();
        let mut app = fx.app();
        assert_eq!(app.session().viewport(), Viewport::new(100, 100));

        app.open(fx.cars(), &mut Vec::new()).unwrap();
        assert_eq!(image_size(&fx.preview()), (100, 50));
    }

    #[test]
    fn test_missing_parent_keeps_running() {
        let fx = Fixture::new();
        let mut app = fx.app();

        let out = run(&mut app, "open /definitely/not/here\nstatus\n");
        assert!(out.contains("Folder not found"), "{}", out);
        assert!(out.contains("No car folder loaded"));
        assert!(!fx.preview().exists());
        assert!(app.session().entities().is_none());
    }
}
