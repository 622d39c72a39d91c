// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Loading input images and saving rendered overlays.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::DynamicImage;
#[cfg(feature = "video")]
use video_rs::{Encoder, Time, encode::Settings as EncoderSettings};

use crate::error::{AnalyzerError, Result};
use crate::source::SourceMeta;

#[cfg(feature = "video")]
static INIT: std::sync::Once = std::sync::Once::new();

/// Initialize `video-rs` once per process. A no-op without the `video` feature.
#[allow(clippy::missing_const_for_fn)]
pub fn init_video() {
    #[cfg(feature = "video")]
    INIT.call_once(|| {
        if let Err(e) = video_rs::init() {
            crate::warn!("Failed to initialize video-rs: {e}");
        }
    });
}

/// Find the next free run directory under `base`: `analyze`, `analyze2`, `analyze3`, ...
#[must_use]
pub fn find_next_run_dir(base: &Path, prefix: &str) -> PathBuf {
    let first = base.join(prefix);
    if !first.exists() {
        return first;
    }
    (2u32..)
        .map(|i| base.join(format!("{prefix}{i}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

/// Load an image from disk.
///
/// Baseline RGB and grayscale JPEGs go through `jpeg-decoder` directly;
/// everything else (and any JPEG it rejects) falls back to `image::open`.
///
/// # Errors
///
/// Returns an image error if the file cannot be decoded.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));

    if is_jpeg && let Some(image) = decode_jpeg(path) {
        return Ok(image);
    }
    Ok(image::open(path)?)
}

fn decode_jpeg(path: &Path) -> Option<DynamicImage> {
    let file = File::open(path).ok()?;
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
    let pixels = decoder.decode().ok()?;
    let info = decoder.info()?;
    let (width, height) = (u32::from(info.width), u32::from(info.height));
    match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => {
            image::ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
        }
        jpeg_decoder::PixelFormat::L8 => {
            image::ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
        }
        _ => None,
    }
}

/// Encodes rendered frames into an H.264 mp4.
#[cfg(feature = "video")]
pub struct VideoWriter {
    encoder: Encoder,
    frame_duration: Time,
    position: Time,
    width: usize,
    height: usize,
}

#[cfg(feature = "video")]
impl VideoWriter {
    /// Open `path` for writing `width`x`height` frames at `fps`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or encoder cannot be created.
    pub fn new(path: &Path, width: usize, height: usize, fps: f32) -> Result<Self> {
        init_video();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AnalyzerError::IoError(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let settings = EncoderSettings::preset_h264_yuv420p(width, height, false);
        let encoder = Encoder::new(path, settings).map_err(|e| {
            AnalyzerError::VideoError(format!("Failed to create video encoder: {e}"))
        })?;

        Ok(Self {
            encoder,
            frame_duration: Time::from_secs_f64(1.0 / f64::from(fps.max(1.0))),
            position: Time::zero(),
            width,
            height,
        })
    }

    /// Append a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame size differs from the video or encoding fails.
    pub fn write_frame(&mut self, frame: &DynamicImage) -> Result<()> {
        let rgb = frame.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        if (width, height) != (self.width, self.height) {
            return Err(AnalyzerError::VideoError(format!(
                "Frame is {width}x{height}, video is {}x{}",
                self.width, self.height
            )));
        }

        let array = ndarray::Array3::from_shape_vec((height, width, 3), rgb.into_raw())
            .map_err(|e| AnalyzerError::VideoError(e.to_string()))?;
        self.encoder
            .encode(&array, self.position)
            .map_err(|e| AnalyzerError::VideoError(format!("Failed to encode frame: {e}")))?;
        self.position = self.position.aligned_with(self.frame_duration).add();
        Ok(())
    }

    /// Flush and close the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder fails to finish.
    pub fn finish(mut self) -> Result<()> {
        self.encoder
            .finish()
            .map_err(|e| AnalyzerError::VideoError(format!("Failed to finish video: {e}")))
    }
}

/// Saves rendered frames into a run directory.
///
/// Still images keep their file name. Video frames are re-encoded into
/// `<stem>.mp4` with the `video` feature, or written as `<stem>_<frame>.jpg`
/// without it.
pub struct OverlayWriter {
    save_dir: PathBuf,
    #[cfg(feature = "video")]
    video: Option<VideoWriter>,
    saved: usize,
}

impl OverlayWriter {
    /// Create a writer for `save_dir`. The directory is created on first save.
    #[must_use]
    pub fn new(save_dir: PathBuf) -> Self {
        Self {
            save_dir,
            #[cfg(feature = "video")]
            video: None,
            saved: 0,
        }
    }

    /// Output directory.
    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Frames saved so far.
    #[must_use]
    pub const fn saved(&self) -> usize {
        self.saved
    }

    /// Save one rendered frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, image or video frame cannot be written.
    pub fn save(&mut self, meta: &SourceMeta, rendered: &DynamicImage) -> Result<()> {
        std::fs::create_dir_all(&self.save_dir).map_err(|e| {
            AnalyzerError::IoError(format!(
                "Failed to create directory {}: {e}",
                self.save_dir.display()
            ))
        })?;

        let source = Path::new(&meta.path);
        let stem = source.file_stem().unwrap_or_default().to_string_lossy();

        #[cfg(feature = "video")]
        if meta.is_video {
            if self.video.is_none() {
                let path = self.save_dir.join(format!("{stem}.mp4"));
                let writer = VideoWriter::new(
                    &path,
                    rendered.width() as usize,
                    rendered.height() as usize,
                    meta.fps.unwrap_or(30.0),
                )?;
                self.video = Some(writer);
            }
            if let Some(writer) = &mut self.video {
                writer.write_frame(rendered)?;
            }
            self.saved += 1;
            return Ok(());
        }

        let file_name = if meta.is_video {
            format!("{stem}_{}.jpg", meta.frame_idx)
        } else {
            source
                .file_name()
                .map_or_else(|| format!("frame_{}.jpg", meta.frame_idx), |n| {
                    n.to_string_lossy().to_string()
                })
        };
        let path = self.save_dir.join(file_name);
        // JPEG has no alpha channel
        let is_jpeg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
        if is_jpeg {
            DynamicImage::ImageRgb8(rendered.to_rgb8()).save(&path)?;
        } else {
            rendered.save(&path)?;
        }
        self.saved += 1;
        Ok(())
    }

    /// Finish any open video.
    ///
    /// # Errors
    ///
    /// Returns an error if the video encoder fails to finish.
    pub fn finish(self) -> Result<()> {
        #[cfg(feature = "video")]
        if let Some(writer) = self.video {
            writer.finish()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vision-analyzer-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_find_next_run_dir() {
        let base = temp_dir("runs");
        let _ = std::fs::remove_dir_all(&base);

        assert_eq!(find_next_run_dir(&base, "analyze"), base.join("analyze"));
        std::fs::create_dir_all(base.join("analyze")).unwrap();
        assert_eq!(find_next_run_dir(&base, "analyze"), base.join("analyze2"));
        std::fs::create_dir_all(base.join("analyze2")).unwrap();
        assert_eq!(find_next_run_dir(&base, "analyze"), base.join("analyze3"));

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn test_overlay_writer_and_load_image() {
        let dir = temp_dir("overlay");
        let _ = std::fs::remove_dir_all(&dir);

        let mut writer = OverlayWriter::new(dir.clone());
        let meta = SourceMeta {
            path: "inputs/pose.png".to_string(),
            frame_idx: 0,
            total_frames: Some(1),
            fps: None,
            is_video: false,
        };
        let image = DynamicImage::new_rgb8(16, 8);
        writer.save(&meta, &image).unwrap();
        assert_eq!(writer.saved(), 1);
        writer.finish().unwrap();

        let loaded = load_image(&dir.join("pose.png")).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (16, 8));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_image_missing_file() {
        assert!(load_image(Path::new("definitely/not/here.jpg")).is_err());
    }
}
