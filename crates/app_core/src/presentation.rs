//! Presentation pipeline: fit to viewport, resample, adjust contrast

use crate::image_loader::load_image;
use crate::AppError;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Display ceilings applied regardless of how large the viewport is
pub const MAX_DISPLAY_WIDTH: u32 = 800;
pub const MAX_DISPLAY_HEIGHT: u32 = 600;

/// Contrast slider bounds
pub const MIN_CONTRAST: f32 = 0.5;
pub const MAX_CONTRAST: f32 = 2.0;

/// Pixel interpolation used when scaling for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResamplingMode {
    /// Lanczos3, quality over speed
    #[default]
    #[serde(rename = "high_quality")]
    HighQuality,
    #[serde(rename = "nearest")]
    Nearest,
}

impl ResamplingMode {
    pub fn toggled(self) -> Self {
        match self {
            ResamplingMode::HighQuality => ResamplingMode::Nearest,
            ResamplingMode::Nearest => ResamplingMode::HighQuality,
        }
    }

    pub fn filter(self) -> FilterType {
        match self {
            ResamplingMode::HighQuality => FilterType::Lanczos3,
            ResamplingMode::Nearest => FilterType::Nearest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResamplingMode::HighQuality => "high_quality",
            ResamplingMode::Nearest => "nearest",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high_quality" | "hq" | "lanczos" | "on" => Some(ResamplingMode::HighQuality),
            "nearest" | "off" => Some(ResamplingMode::Nearest),
            _ => None,
        }
    }
}

/// Settings read on every redraw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySettings {
    pub resampling: ResamplingMode,
    contrast: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            resampling: ResamplingMode::HighQuality,
            contrast: 1.0,
        }
    }
}

impl DisplaySettings {
    pub fn new(resampling: ResamplingMode, contrast: f32) -> Self {
        let mut settings = Self { resampling, contrast: 1.0 };
        settings.set_contrast(contrast);
        settings
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    /// Set the contrast factor, clamped to [`MIN_CONTRAST`, `MAX_CONTRAST`].
    /// Returns the value actually applied.
    pub fn set_contrast(&mut self, factor: f32) -> f32 {
        self.contrast = if factor.is_finite() {
            factor.clamp(MIN_CONTRAST, MAX_CONTRAST)
        } else {
            1.0
        };
        self.contrast
    }

    /// Move the contrast by `delta`, snapping to one decimal like the slider does
    pub fn step_contrast(&mut self, delta: f32) -> f32 {
        let stepped = ((self.contrast + delta) * 10.0).round() / 10.0;
        self.set_contrast(stepped)
    }

    pub fn toggle_resampling(&mut self) -> ResamplingMode {
        self.resampling = self.resampling.toggled();
        self.resampling
    }
}

/// Consumer-provided drawing area, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse "WIDTHxHEIGHT"
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.trim().split_once(['x', 'X'])?;
        Some(Self::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(MAX_DISPLAY_WIDTH, MAX_DISPLAY_HEIGHT)
    }
}

/// Upper bound for the displayed size, independent of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLimits {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for DisplayLimits {
    fn default() -> Self {
        Self {
            max_width: MAX_DISPLAY_WIDTH,
            max_height: MAX_DISPLAY_HEIGHT,
        }
    }
}

/// A rendered image ready for the consumer to blit
#[derive(Debug, Clone)]
pub struct Frame {
    pub source: PathBuf,
    pub original_size: (u32, u32),
    pub image: RgbaImage,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGBA8 pixels, row-major
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Uniform scale that fits `original` into the viewport, clamped by `limits`.
/// Upscales small images. Each side is at least one pixel.
pub fn fit_dimensions(original: (u32, u32), viewport: Viewport, limits: DisplayLimits) -> (u32, u32) {
    let (width, height) = original;
    if width == 0 || height == 0 {
        return (width.max(1), height.max(1));
    }

    let max_width = viewport.width.min(limits.max_width).max(1) as f64;
    let max_height = viewport.height.min(limits.max_height).max(1) as f64;

    let scale = (max_width / width as f64).min(max_height / height as f64);

    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Contrast around the mean luminance: `mid + (p - mid) * factor` per colour
/// channel, clamped to 0..=255. Alpha is left alone.
///
/// A factor of exactly 1.0 returns without touching the buffer.
pub fn adjust_contrast(image: &mut RgbaImage, factor: f32) {
    if factor == 1.0 {
        return;
    }

    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return;
    }

    // ITU-R 601-2 luma, same weights as an L conversion
    let luma_sum: u64 = image
        .pixels()
        .map(|p| {
            let [r, g, b, _] = p.0;
            (u64::from(r) * 19595 + u64::from(g) * 38470 + u64::from(b) * 7471 + 0x8000) >> 16
        })
        .sum();
    let mid = (luma_sum as f64 / pixel_count as f64 + 0.5).floor() as f32;

    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        let out = mid + (value as f32 - mid) * factor;
        *slot = out.round().clamp(0.0, 255.0) as u8;
    }

    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = lut[usize::from(*channel)];
        }
    }
}

/// Scale `source` for display and apply the display settings
pub fn render(
    source: &DynamicImage,
    viewport: Viewport,
    limits: DisplayLimits,
    settings: &DisplaySettings,
) -> RgbaImage {
    let (width, height) = fit_dimensions(source.dimensions(), viewport, limits);
    let mut image = source
        .resize_exact(width, height, settings.resampling.filter())
        .into_rgba8();

    adjust_contrast(&mut image, settings.contrast());
    image
}

/// Decode `path` and render it. The file is only read.
pub fn render_file(
    path: &Path,
    viewport: Viewport,
    limits: DisplayLimits,
    settings: &DisplaySettings,
) -> Result<Frame, AppError> {
    let source = load_image(path)?;
    let original_size = source.dimensions();
    let image = render(&source, viewport, limits, settings);

    tracing::debug!(
        "Rendered {} {}x{} -> {}x{} ({}, contrast {:.1})",
        path.display(),
        original_size.0,
        original_size.1,
        image.width(),
        image.height(),
        settings.resampling.as_str(),
        settings.contrast()
    );

    Ok(Frame {
        source: path.to_path_buf(),
        original_size,
        image,
    })
}
