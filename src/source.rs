// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame sources for analysis.
//!
//! A [`Source`] is a finite, ordered sequence of frames: a single image, a
//! list or directory of images, a glob, or a video file (with the `video`
//! feature). Each frame is analyzed independently.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{AnalyzerError, Result};
use crate::io::load_image;

const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"];
const VIDEO_EXTENSIONS: [&str; 10] = [
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v", "mpeg", "mpg",
];

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        extensions.contains(&ext.as_str())
    })
}

/// Where frames come from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Path to an image file.
    Image(PathBuf),
    /// In-memory image.
    ImageBuffer(DynamicImage),
    /// List of image paths, in order.
    ImageList(Vec<PathBuf>),
    /// Directory of images, sorted by path.
    Directory(PathBuf),
    /// Simple `dir/*.ext` pattern.
    Glob(String),
    /// Video file.
    Video(PathBuf),
}

impl Source {
    /// Whether this source is a video.
    #[must_use]
    pub const fn is_video(&self) -> bool {
        matches!(self, Self::Video(_))
    }

    /// The path, for single-path sources.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Image(p) | Self::Video(p) | Self::Directory(p) => Some(p),
            _ => None,
        }
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if s.contains('*') {
            return Self::Glob(s.to_string());
        }
        let path = PathBuf::from(s);
        if path.is_dir() {
            Self::Directory(path)
        } else if has_extension(&path, &VIDEO_EXTENSIONS) {
            Self::Video(path)
        } else {
            Self::Image(path)
        }
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::from(path.to_string_lossy().as_ref())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::from(path.as_path())
    }
}

impl From<DynamicImage> for Source {
    fn from(image: DynamicImage) -> Self {
        Self::ImageBuffer(image)
    }
}

impl From<Vec<PathBuf>> for Source {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self::ImageList(paths)
    }
}

/// Metadata about one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMeta {
    /// Source path or identifier.
    pub path: String,
    /// Frame index within the source.
    pub frame_idx: usize,
    /// Total frames, if known.
    pub total_frames: Option<usize>,
    /// Frames per second, for video.
    pub fps: Option<f32>,
    /// Whether the frame was decoded from a video.
    pub is_video: bool,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            path: String::new(),
            frame_idx: 0,
            total_frames: Some(1),
            fps: None,
            is_video: false,
        }
    }
}

/// Iterator over the frames of a [`Source`].
pub struct SourceIterator {
    source: Source,
    current_frame: usize,
    image_paths: Vec<PathBuf>,
    #[cfg(feature = "video")]
    decoder: Option<video_rs::decode::Decoder>,
    #[cfg(feature = "video")]
    total_frames: Option<usize>,
}

impl SourceIterator {
    /// Open a source.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or glob base does not exist.
    pub fn new(source: Source) -> Result<Self> {
        let image_paths = match &source {
            Source::Image(path) => vec![path.clone()],
            Source::ImageList(paths) => paths.clone(),
            Source::Directory(path) => collect_images(path, None)?,
            Source::Glob(pattern) => collect_glob(pattern)?,
            Source::ImageBuffer(_) | Source::Video(_) => Vec::new(),
        };

        Ok(Self {
            source,
            current_frame: 0,
            image_paths,
            #[cfg(feature = "video")]
            decoder: None,
            #[cfg(feature = "video")]
            total_frames: None,
        })
    }

    /// Number of frames, when known up front.
    #[must_use]
    pub fn len_hint(&self) -> Option<usize> {
        match &self.source {
            Source::ImageBuffer(_) => Some(1),
            Source::Video(_) => None,
            _ => Some(self.image_paths.len()),
        }
    }

    fn next_image(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        let path = self.image_paths.get(self.current_frame)?;
        let meta = SourceMeta {
            path: path.to_string_lossy().to_string(),
            frame_idx: self.current_frame,
            total_frames: Some(self.image_paths.len()),
            fps: None,
            is_video: false,
        };
        self.current_frame += 1;

        Some(
            load_image(path)
                .map(|image| (image, meta))
                .map_err(|e| AnalyzerError::ImageError(format!("Failed to load {}: {e}", path.display()))),
        )
    }

    #[cfg(feature = "video")]
    fn next_video_frame(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        let Source::Video(path) = &self.source else {
            return None;
        };

        if self.decoder.is_none() {
            crate::io::init_video();
            match video_rs::decode::Decoder::new(path.as_path()) {
                Ok(decoder) => {
                    if let Ok(duration) = decoder.duration() {
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        let total =
                            (duration.as_secs_f64() * f64::from(decoder.frame_rate())) as usize;
                        self.total_frames = Some(total);
                    }
                    self.decoder = Some(decoder);
                }
                Err(e) => {
                    let error = AnalyzerError::VideoError(format!(
                        "Failed to open {}: {e}",
                        path.display()
                    ));
                    // Report once, then stop
                    self.source = Source::ImageList(Vec::new());
                    return Some(Err(error));
                }
            }
        }

        let decoder = self.decoder.as_mut()?;
        match decoder.decode() {
            Ok((_, frame)) => {
                let meta = SourceMeta {
                    path: path.to_string_lossy().to_string(),
                    frame_idx: self.current_frame,
                    total_frames: self.total_frames,
                    fps: Some(decoder.frame_rate()),
                    is_video: true,
                };
                self.current_frame += 1;
                Some(video_frame_to_image(&frame).map(|image| (image, meta)))
            }
            Err(video_rs::Error::DecodeExhausted) => None,
            Err(e) => {
                self.decoder = None;
                self.source = Source::ImageList(Vec::new());
                Some(Err(AnalyzerError::VideoError(format!("Failed to decode frame: {e}"))))
            }
        }
    }

    #[cfg(not(feature = "video"))]
    fn next_video_frame(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        if self.current_frame > 0 {
            return None;
        }
        self.current_frame = 1;
        Some(Err(AnalyzerError::FeatureNotEnabled(
            "Video sources require the 'video' feature".to_string(),
        )))
    }
}

impl Iterator for SourceIterator {
    type Item = Result<(DynamicImage, SourceMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        match &self.source {
            Source::Image(_) | Source::ImageList(_) | Source::Directory(_) | Source::Glob(_) => {
                self.next_image()
            }
            Source::ImageBuffer(image) => {
                if self.current_frame > 0 {
                    return None;
                }
                self.current_frame = 1;
                let meta = SourceMeta {
                    path: "image".to_string(),
                    ..SourceMeta::default()
                };
                Some(Ok((image.clone(), meta)))
            }
            Source::Video(_) => self.next_video_frame(),
        }
    }
}

/// Sorted image files in `dir`, optionally restricted to one extension.
fn collect_images(dir: &Path, extension: Option<&str>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AnalyzerError::IoError(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| match extension {
            Some(ext) => has_extension(path, &[ext]),
            None => has_extension(path, &IMAGE_EXTENSIONS),
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Expand a `dir/*` or `dir/*.ext` pattern.
fn collect_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let Some(star) = pattern.find('*') else {
        return Ok(vec![PathBuf::from(pattern)]);
    };

    let dir_part = pattern[..star].trim_end_matches(['/', '\\']);
    let dir = if dir_part.is_empty() {
        Path::new(".")
    } else {
        Path::new(dir_part)
    };
    let extension = pattern[star..].strip_prefix("*.").map(str::to_lowercase);
    collect_images(dir, extension.as_deref())
}

#[cfg(feature = "video")]
fn video_frame_to_image(frame: &video_rs::Frame) -> Result<DynamicImage> {
    let shape = frame.shape();
    let (height, width) = (
        u32::try_from(shape[0]).map_err(|e| AnalyzerError::VideoError(e.to_string()))?,
        u32::try_from(shape[1]).map_err(|e| AnalyzerError::VideoError(e.to_string()))?,
    );
    let raw: Vec<u8> = frame.iter().copied().collect();
    image::RgbImage::from_raw(width, height, raw)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| {
            AnalyzerError::VideoError(format!("Frame buffer does not match {width}x{height}"))
        })
}
