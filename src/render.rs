// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Skeleton overlay rendering.
//!
//! [`SkeletonRenderer`] draws bones, joint markers and an optional angle label
//! onto a copy of the input image. The input is never modified.

#[cfg(feature = "annotate")]
use std::fs::{self, File};
#[cfg(feature = "annotate")]
use std::io;
#[cfg(feature = "annotate")]
use std::path::{Path, PathBuf};

#[cfg(feature = "annotate")]
use ab_glyph::{FontArc, PxScale};
use image::{DynamicImage, ImageBuffer, Pixel, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

use crate::color::Color;
use crate::config::RenderConfig;
#[cfg(any(feature = "annotate", test))]
use crate::error::AnalyzerError;
use crate::error::Result;
use crate::geometry::{ImageSize, Point2D};
use crate::posture::round_to_tenth;
use crate::results::{JointObservation, find};
use crate::skeleton::JointCatalog;

/// Assets URL for downloading fonts
#[cfg(feature = "annotate")]
const ASSETS_URL: &str = "https://github.com/ultralytics/assets/releases/download/v0.0.0";

/// Default label font, fetched into the config directory on first use.
#[cfg(feature = "annotate")]
pub const DEFAULT_FONT: &str = "Arial.ttf";

/// Format an angle for the overlay label: rounded to one decimal.
///
/// ```rust
/// use vision_analyzer::render::format_angle;
///
/// assert_eq!(format_angle(-21.801_409), "-21.8");
/// assert_eq!(format_angle(90.0), "90.0");
/// ```
#[must_use]
pub fn format_angle(degrees: f64) -> String {
    format!("{:.1}", round_to_tenth(degrees))
}

/// Pixel types the renderer can paint into.
trait Paint: Pixel<Subpixel = u8> + 'static {
    fn paint(color: Color) -> Self;
}

impl Paint for Rgb<u8> {
    fn paint(color: Color) -> Self {
        color.to_rgb()
    }
}

impl Paint for Rgba<u8> {
    fn paint(color: Color) -> Self {
        color.to_rgba()
    }
}

/// Owned drawing surface, released when dropped.
enum Canvas {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl Canvas {
    /// Copy `image` into a new surface, keeping RGB8/RGBA8 formats.
    fn from_image(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageRgb8(buffer) => Self::Rgb(buffer.clone()),
            DynamicImage::ImageRgba8(buffer) => Self::Rgba(buffer.clone()),
            other => Self::Rgba(other.to_rgba8()),
        }
    }

    fn line(&mut self, from: Point2D, to: Point2D, width: u32, color: Color) {
        match self {
            Self::Rgb(img) => thick_line(img, from, to, width, Rgb::paint(color)),
            Self::Rgba(img) => thick_line(img, from, to, width, Rgba::paint(color)),
        }
    }

    fn ring(&mut self, center: Point2D, radius: i32, stroke: u32, color: Color) {
        match self {
            Self::Rgb(img) => ring(img, center, radius, stroke, Rgb::paint(color)),
            Self::Rgba(img) => ring(img, center, radius, stroke, Rgba::paint(color)),
        }
    }

    #[cfg(feature = "annotate")]
    fn text(&mut self, origin: (i32, i32), size: f32, font: &FontArc, text: &str, color: Color) {
        use imageproc::drawing::draw_text_mut;

        let scale = PxScale::from(size);
        let (x, y) = origin;
        match self {
            Self::Rgb(img) => draw_text_mut(img, Rgb::paint(color), x, y, scale, font, text),
            Self::Rgba(img) => draw_text_mut(img, Rgba::paint(color), x, y, scale, font, text),
        }
    }

    fn into_image(self) -> DynamicImage {
        match self {
            Self::Rgb(img) => DynamicImage::ImageRgb8(img),
            Self::Rgba(img) => DynamicImage::ImageRgba8(img),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn thick_line<P: Paint>(
    img: &mut ImageBuffer<P, Vec<u8>>,
    from: Point2D,
    to: Point2D,
    width: u32,
    color: P,
) {
    let (x1, y1) = (from.x as f32, from.y as f32);
    let (x2, y2) = (to.x as f32, to.y as f32);
    let (dx, dy) = (x2 - x1, y2 - y1);
    let length = dx.hypot(dy);
    let (nx, ny) = if length > 0.0 {
        (-dy / length, dx / length)
    } else {
        (0.0, 0.0)
    };

    let width = width.max(1);
    let half = (width - 1) as f32 / 2.0;
    for pass in 0..width {
        let offset = pass as f32 - half;
        let (ox, oy) = (nx * offset, ny * offset);
        draw_line_segment_mut(img, (x1 + ox, y1 + oy), (x2 + ox, y2 + oy), color);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn ring<P: Paint>(
    img: &mut ImageBuffer<P, Vec<u8>>,
    center: Point2D,
    radius: i32,
    stroke: u32,
    color: P,
) {
    let center = (center.x.round() as i32, center.y.round() as i32);
    let stroke = stroke.max(1) as i32;
    // Stroke is centered on the circle's path
    let inner = radius - stroke / 2;
    for step in 0..stroke {
        draw_hollow_circle_mut(img, center, (inner + step).max(0), color);
    }
}

/// Draws a skeleton overlay for a set of joint observations.
///
/// # Example
///
/// ```rust
/// use image::DynamicImage;
/// use vision_analyzer::{Joint, JointObservation, Point2D, RenderConfig, SkeletonRenderer};
///
/// let renderer = SkeletonRenderer::new(RenderConfig::default());
/// let image = DynamicImage::new_rgb8(320, 240);
/// let observations = [
///     JointObservation::detected(Joint::Neck, Point2D::new(160.0, 60.0)),
///     JointObservation::detected(Joint::Root, Point2D::new(160.0, 180.0)),
/// ];
///
/// let overlay = renderer.render(&image, &observations, None).unwrap();
/// assert_eq!((overlay.width(), overlay.height()), (320, 240));
/// ```
#[derive(Debug, Clone)]
pub struct SkeletonRenderer {
    config: RenderConfig,
    catalog: JointCatalog,
    #[cfg(feature = "annotate")]
    font: Option<FontArc>,
}

impl SkeletonRenderer {
    /// Create a renderer with the standard skeleton and no label font.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            catalog: JointCatalog::standard(),
            #[cfg(feature = "annotate")]
            font: None,
        }
    }

    /// Use a different bone catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: JointCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Enable the angle label with `font`.
    #[cfg(feature = "annotate")]
    #[must_use]
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Rendering configuration.
    #[must_use]
    pub const fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Whether an angle label will be drawn.
    #[must_use]
    pub const fn has_font(&self) -> bool {
        #[cfg(feature = "annotate")]
        {
            self.font.is_some()
        }
        #[cfg(not(feature = "annotate"))]
        {
            false
        }
    }

    /// Render the overlay onto a copy of `image`.
    ///
    /// For every observation whose joint is drawable, the bone to its parent
    /// is drawn first (only when neither end is missing or at `(0, 0)`), then
    /// the joint marker. Undetected joints keep their marker at `(0, 0)`.
    /// `angle` is drawn as a label when a font is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AnalyzerError::InvalidImageDimensions`] for an empty image.
    /// Any non-empty image yields an in-memory canvas, so this renderer never
    /// returns [`crate::AnalyzerError::DrawingSurfaceFailure`].
    pub fn render(
        &self,
        image: &DynamicImage,
        observations: &[JointObservation],
        angle: Option<f64>,
    ) -> Result<DynamicImage> {
        let size = ImageSize::of(image)?;
        let mut canvas = Canvas::from_image(image);
        let radius = self.config.marker_radius(size.width(), size.height());

        for observation in observations {
            if !self.config.drawable.contains(&observation.joint) {
                continue;
            }

            if let Some(bone) = self.catalog.bone(observation.joint)
                && let Some(parent) = find(observations, bone.parent)
                && let Some(from) = observation.position.filter(|p| !p.is_zero())
                && let Some(to) = parent.position.filter(|p| !p.is_zero())
            {
                canvas.line(from, to, self.config.bone_width, bone.color);
            }

            canvas.ring(
                observation.value(),
                radius,
                self.config.marker_stroke,
                self.config.marker_color,
            );
        }

        #[cfg(feature = "annotate")]
        if let (Some(angle), Some(font)) = (angle, &self.font) {
            canvas.text(
                self.config.label_origin,
                self.config.label_size,
                font,
                &format_angle(angle),
                self.config.label_color,
            );
        }
        #[cfg(not(feature = "annotate"))]
        let _ = angle;

        Ok(canvas.into_image())
    }
}

impl Default for SkeletonRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

/// Load a TrueType/OpenType font from disk.
///
/// # Errors
///
/// Returns an IO error if the file cannot be read, or a config error if it
/// is not a valid font.
#[cfg(feature = "annotate")]
pub fn load_font(path: &Path) -> Result<FontArc> {
    let data = fs::read(path).map_err(|e| {
        AnalyzerError::IoError(format!("Failed to read font {}: {e}", path.display()))
    })?;
    FontArc::try_from_vec(data).map_err(|e| {
        AnalyzerError::ConfigError(format!("Invalid font {}: {e}", path.display()))
    })
}

/// Locate `font` in the config directory, downloading it on first use.
///
/// # Errors
///
/// Returns an error if there is no config directory or the download fails.
#[cfg(feature = "annotate")]
pub fn cached_font(font: &str) -> Result<PathBuf> {
    let font_name = Path::new(font)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AnalyzerError::ConfigError(format!("Invalid font name '{font}'")))?;
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AnalyzerError::IoError("No config directory available".to_string()))?
        .join("vision-analyzer");
    let font_path = config_dir.join(&font_name);

    if font_path.exists() {
        return Ok(font_path);
    }

    fs::create_dir_all(&config_dir).map_err(|e| {
        AnalyzerError::IoError(format!(
            "Failed to create config directory {}: {e}",
            config_dir.display()
        ))
    })?;

    let url = format!("{ASSETS_URL}/{font_name}");
    crate::info!("Downloading {url} to {}", font_path.display());

    let response = ureq::get(&url)
        .call()
        .map_err(|e| AnalyzerError::IoError(format!("Failed to download font from {url}: {e}")))?;
    let mut file = File::create(&font_path)?;
    let mut reader = response.into_body().into_reader();
    if let Err(e) = io::copy(&mut reader, &mut file) {
        // Remove the partial file
        let _ = fs::remove_file(&font_path);
        return Err(AnalyzerError::IoError(format!("Failed to download font: {e}")));
    }

    Ok(font_path)
}
