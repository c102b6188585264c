//! Batch Labeler - label vehicle image folders from the terminal
//!
//! Main entry point.

mod app;
mod input;

use anyhow::{Context, Result};
use app_core::{AppConfig, Viewport};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "batch_labeler", about = "Browse per-vehicle image folders and label them")]
struct Args {
    /// Parent folder whose subfolders are the vehicles to label
    #[arg(short, long)]
    parent: Option<PathBuf>,

    /// Display area as WIDTHxHEIGHT
    #[arg(short, long, value_parser = parse_viewport, default_value = "800x600")]
    viewport: Viewport,

    /// Where the rendered frame is written after each redraw
    #[arg(long, default_value = "batch_labeler_preview.png")]
    preview: PathBuf,

    /// Configuration file (defaults to the per-user config)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_viewport(s: &str) -> Result<Viewport, String> {
    Viewport::parse(s).ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", s))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging and panic hook first
    app_log::init()?;

    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("Batch Labeler starting...");

    let config_path = args.config.unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)
        .with_context(|| format!("Cannot load configuration from {}", config_path.display()))?;

    let mut app = app::App::new(config, config_path, args.preview, args.viewport);
    if let Some(parent) = args.parent {
        app.open(parent, &mut std::io::stdout())?;
    }

    let stdin = std::io::stdin();
    app.run(stdin.lock(), &mut std::io::stdout())?;

    tracing::info!("Batch Labeler exiting");
    Ok(())
}
