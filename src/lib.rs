// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Vision Analyzer
//!
//! Human posture analysis from pose-detector output. Given an image and a
//! pose detector, the library extracts a fixed set of body joints, maps them
//! into pixel space, measures posture angles between joints and draws a
//! skeleton overlay.
//!
//! ## Features
//!
//! - **Detector agnostic** - Anything implementing [`Detector`] works: recorded
//!   JSON output, YOLO-pose keypoint tensors, or a closure
//! - **Posture lines** - Forward lean, spine tilt, hip movement and knee flexion
//!   from one table of three-point angle definitions
//! - **Explicit "not detected"** - Missing joints are `None` internally and only
//!   become `(0, 0)` at export time
//! - **Overlay rendering** - Bones, joint markers and an angle label on a copy
//!   of the input image
//! - **Multiple Sources** - Images, directories, glob patterns and video
//!
//! ## Quick Start (Library)
//!
//! ```rust
//! use image::DynamicImage;
//! use vision_analyzer::{
//!     AnalyzerConfig, Joint, PostureAnalyzer, PostureLine, RenderConfig, SkeletonRenderer,
//!     StaticDetector,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let image = DynamicImage::new_rgb8(1000, 1000);
//!     let mut detector = StaticDetector::from_points(&[
//!         (Joint::RightHip, 0.10, 0.90, 0.9),
//!         (Joint::RightKnee, 0.10, 0.85, 0.9),
//!         (Joint::RightAnkle, 0.12, 0.80, 0.9),
//!     ]);
//!
//!     let analyzer = PostureAnalyzer::new(AnalyzerConfig::default());
//!     let observations = analyzer.analyze(&image, &mut detector);
//!     let angle = analyzer.measure_angle(&observations, PostureLine::RightKneeAngle);
//!     println!("right knee: {angle:.1}°");
//!
//!     let overlay = SkeletonRenderer::new(RenderConfig::default())
//!         .render(&image, &observations, Some(angle))?;
//!     assert_eq!(overlay.width(), image.width());
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Knee angle for every frame of a recorded session
//! vision-analyzer analyze --source frames/ --detections frames.json --line right-knee-angle
//!
//! # Save overlays and export joint positions
//! vision-analyzer analyze -s squat.mp4 -d squat.json --save --export runs/squat.csv
//!
//! # List posture lines
//! vision-analyzer lines
//! ```
//!
//! **CLI Options:**
//!
//! | Option | Short | Description | Default |
//! |--------|-------|-------------|---------|
//! | `--source` | `-s` | Image, directory, glob or video | required |
//! | `--detections` | `-d` | Recorded detector output (JSON) | required |
//! | `--line` | `-l` | Posture line to measure | `forward-line` |
//! | `--joints` | | Comma-separated joint list | all 19 |
//! | `--conf` | | Confidence threshold (strict) | `0.0` |
//! | `--save` | | Save rendered overlays | `false` |
//! | `--export` | | Write observations to `.json` or `.csv` | none |
//! | `--font` | | Label font (TTF) | `Arial.ttf` |
//! | `--verbose` | | Per-frame output | `true` |
//! | `--debug` | | Trace analysis phases | `false` |
//!
//! ## Coordinate Spaces
//!
//! Detectors report normalized points with the origin at the bottom-left.
//! Observations are in pixels with the origin at the top-left:
//!
//! ```rust
//! use vision_analyzer::geometry::{to_image_space, ImageSize, Point2D};
//!
//! let size = ImageSize::new(640, 480).unwrap();
//! assert_eq!(to_image_space(Point2D::new(0.0, 0.0), size), Point2D::new(0.0, 480.0));
//! assert_eq!(to_image_space(Point2D::new(1.0, 1.0), size), Point2D::new(640.0, 0.0));
//! ```
//!
//! ## Modules
//!
//! - [`skeleton`] - Joints and the bone hierarchy
//! - [`geometry`] - Coordinate mapping and angle math
//! - [`detector`] - The detector seam and provided detectors
//! - [`analyzer`] - Detector output to joint observations
//! - [`posture`] - Posture line definitions and measurement
//! - [`render`] - Skeleton overlay
//! - [`results`] - Observations and export
//! - [`source`] - Image, directory and video sources
//! - [`io`] - Image loading and overlay saving

pub mod logging;

pub mod analyzer;
pub mod color;
pub mod config;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod io;
pub mod posture;
pub mod render;
pub mod results;
pub mod skeleton;
pub mod source;

// Re-exports for convenience
pub use analyzer::{AnalysisPhase, PostureAnalyzer};
pub use color::Color;
pub use config::{AnalyzerConfig, RenderConfig};
pub use detector::{
    Detections, Detector, FailingDetector, KeypointArrayDetector, RecognizedPoint,
    ReplayDetector, StaticDetector,
};
pub use error::{AnalyzerError, Result};
pub use geometry::{ImageSize, Point2D};
pub use posture::{PostureLine, measure_angle};
pub use render::SkeletonRenderer;
pub use results::{FrameRecord, JointObservation, ObservationRow};
pub use skeleton::{BoneLink, Joint, JointCatalog};
pub use source::{Source, SourceIterator, SourceMeta};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "vision-analyzer");
    }
}
