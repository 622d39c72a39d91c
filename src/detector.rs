// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! The pose detector seam.
//!
//! The analyzer never runs a model itself. It asks a [`Detector`] for the
//! joints it needs and receives, per joint, at most one normalized location
//! (origin bottom-left, `[0, 1]` on both axes) with a confidence score.
//!
//! Provided detectors:
//!
//! - [`StaticDetector`]: fixed detections, for callers that already hold results.
//! - [`ReplayDetector`]: recorded detector output read from JSON, one frame per call.
//! - [`KeypointArrayDetector`]: adapts a COCO-17 keypoint tensor row from a
//!   YOLO-pose style model.
//! - [`FailingDetector`]: always unavailable.
//!
//! Closures `FnMut(&DynamicImage, &[Joint]) -> Result<Detections>` are detectors too.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use image::DynamicImage;
use ndarray::{Array2, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};
use crate::geometry::{ImageSize, Point2D, to_detector_space};
use crate::skeleton::Joint;

/// One joint as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecognizedPoint {
    /// Normalized location, origin bottom-left.
    #[serde(flatten)]
    pub location: Point2D,
    /// Detector confidence.
    #[serde(default = "full_confidence")]
    pub confidence: f32,
}

const fn full_confidence() -> f32 {
    1.0
}

impl RecognizedPoint {
    /// Create a recognized point.
    #[must_use]
    pub const fn new(x: f64, y: f64, confidence: f32) -> Self {
        Self {
            location: Point2D::new(x, y),
            confidence,
        }
    }
}

/// Detector output for one image: zero or one point per joint.
pub type Detections = HashMap<Joint, RecognizedPoint>;

/// Source of joint detections for an image.
pub trait Detector {
    /// Detect `joints` in `image`.
    ///
    /// Joints the detector cannot find are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::DetectionUnavailable`] when detection cannot run at all.
    fn detect(&mut self, image: &DynamicImage, joints: &[Joint]) -> Result<Detections>;
}

impl<F> Detector for F
where
    F: FnMut(&DynamicImage, &[Joint]) -> Result<Detections>,
{
    fn detect(&mut self, image: &DynamicImage, joints: &[Joint]) -> Result<Detections> {
        self(image, joints)
    }
}

/// Returns the same detections for every image.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    detections: Detections,
}

impl StaticDetector {
    /// Wrap fixed detections.
    #[must_use]
    pub const fn new(detections: Detections) -> Self {
        Self { detections }
    }

    /// Build from `(joint, x, y, confidence)` tuples in normalized coordinates.
    #[must_use]
    pub fn from_points(points: &[(Joint, f64, f64, f32)]) -> Self {
        let detections = points
            .iter()
            .map(|&(joint, x, y, confidence)| (joint, RecognizedPoint::new(x, y, confidence)))
            .collect();
        Self { detections }
    }
}

impl Detector for StaticDetector {
    fn detect(&mut self, _image: &DynamicImage, _joints: &[Joint]) -> Result<Detections> {
        Ok(self.detections.clone())
    }
}

/// A detector that is never available.
#[derive(Debug, Clone)]
pub struct FailingDetector {
    reason: String,
}

impl FailingDetector {
    /// Create a detector that fails with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Detector for FailingDetector {
    fn detect(&mut self, _image: &DynamicImage, _joints: &[Joint]) -> Result<Detections> {
        Err(AnalyzerError::DetectionUnavailable(self.reason.clone()))
    }
}

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    #[serde(default)]
    joints: HashMap<String, RecognizedPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordedFile {
    Frames { frames: Vec<RecordedFrame> },
    List(Vec<RecordedFrame>),
}

/// Replays recorded detector output, one frame per [`Detector::detect`] call.
///
/// The JSON file holds either `{"frames": [...]}` or a bare array of frames.
/// Each frame maps joint names (`"right_knee"`, `"rightKnee"`, ...) to
/// `{"x": .., "y": .., "confidence": ..}` in normalized detector space:
///
/// ```json
/// {"frames": [{"joints": {"neck": {"x": 0.51, "y": 0.78, "confidence": 0.92}}}]}
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReplayDetector {
    frames: VecDeque<Detections>,
}

impl ReplayDetector {
    /// Parse recorded frames from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed JSON or unknown joint names.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let recorded: RecordedFile = serde_json::from_str(json)?;
        let frames = match recorded {
            RecordedFile::Frames { frames } | RecordedFile::List(frames) => frames,
        };

        let frames = frames
            .into_iter()
            .map(|frame| {
                frame
                    .joints
                    .into_iter()
                    .map(|(name, point)| Ok((name.parse::<Joint>()?, point)))
                    .collect::<Result<Detections>>()
            })
            .collect::<Result<VecDeque<_>>>()?;

        Ok(Self { frames })
    }

    /// Read recorded frames from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, or a parse error.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AnalyzerError::IoError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Frames not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl Detector for ReplayDetector {
    fn detect(&mut self, _image: &DynamicImage, _joints: &[Joint]) -> Result<Detections> {
        self.frames.pop_front().ok_or_else(|| {
            AnalyzerError::DetectionUnavailable("recorded detections exhausted".to_string())
        })
    }
}

/// COCO-17 keypoint order as emitted by YOLO-pose models.
pub const COCO_KEYPOINTS: [Joint; 17] = [
    Joint::Nose,
    Joint::LeftEye,
    Joint::RightEye,
    Joint::LeftEar,
    Joint::RightEar,
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftElbow,
    Joint::RightElbow,
    Joint::LeftWrist,
    Joint::RightWrist,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftKnee,
    Joint::RightKnee,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

/// Adapts one person's COCO-17 keypoints in pixel space.
///
/// Rows are `[x, y]` or `[x, y, confidence]` in image pixels (top-left
/// origin). COCO has no neck or root, so they are synthesized as the
/// shoulder and hip midpoints, with the weaker of the two confidences.
#[derive(Debug, Clone)]
pub struct KeypointArrayDetector {
    keypoints: Array2<f32>,
}

impl KeypointArrayDetector {
    /// Wrap a `(17, 2)` or `(17, 3)` keypoint array.
    ///
    /// # Errors
    ///
    /// Returns a config error for any other shape.
    pub fn new(keypoints: Array2<f32>) -> Result<Self> {
        let shape = keypoints.shape();
        if shape[0] != COCO_KEYPOINTS.len() || !(shape[1] == 2 || shape[1] == 3) {
            return Err(AnalyzerError::ConfigError(format!(
                "Expected keypoints of shape (17, 2) or (17, 3), got {shape:?}"
            )));
        }
        Ok(Self { keypoints })
    }

    /// Pick person `index` from an `(N, 17, 2|3)` batch.
    ///
    /// # Errors
    ///
    /// Returns a config error if `index` is out of range or the shape is wrong.
    pub fn from_batch(batch: ArrayView3<'_, f32>, index: usize) -> Result<Self> {
        if index >= batch.len_of(Axis(0)) {
            return Err(AnalyzerError::ConfigError(format!(
                "Pose index {index} out of range for {} poses",
                batch.len_of(Axis(0))
            )));
        }
        Self::new(batch.index_axis(Axis(0), index).to_owned())
    }

    /// Convert to normalized detections for an image of `size`.
    #[must_use]
    pub fn to_detections(&self, size: ImageSize) -> Detections {
        keypoints_to_detections(self.keypoints.view(), size)
    }
}

impl Detector for KeypointArrayDetector {
    fn detect(&mut self, image: &DynamicImage, _joints: &[Joint]) -> Result<Detections> {
        let size = ImageSize::of(image)
            .map_err(|e| AnalyzerError::DetectionUnavailable(e.to_string()))?;
        Ok(self.to_detections(size))
    }
}

fn keypoints_to_detections(keypoints: ArrayView2<'_, f32>, size: ImageSize) -> Detections {
    let has_conf = keypoints.len_of(Axis(1)) == 3;
    let mut pixels: HashMap<Joint, (Point2D, f32)> = HashMap::with_capacity(Joint::COUNT);

    for (row, joint) in keypoints.outer_iter().zip(COCO_KEYPOINTS) {
        let confidence = if has_conf { row[2] } else { 1.0 };
        let pixel = Point2D::new(f64::from(row[0]), f64::from(row[1]));
        pixels.insert(joint, (pixel, confidence));
    }

    for (joint, left, right) in [
        (Joint::Neck, Joint::LeftShoulder, Joint::RightShoulder),
        (Joint::Root, Joint::LeftHip, Joint::RightHip),
    ] {
        if let (Some(&(l, lc)), Some(&(r, rc))) = (pixels.get(&left), pixels.get(&right)) {
            pixels.insert(joint, (l.midpoint(r), lc.min(rc)));
        }
    }

    pixels
        .into_iter()
        .map(|(joint, (pixel, confidence))| {
            let location = to_detector_space(pixel, size);
            (joint, RecognizedPoint { location, confidence })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn blank() -> DynamicImage {
        DynamicImage::new_rgb8(100, 200)
    }

    #[test]
    fn test_static_detector() {
        let mut detector = StaticDetector::from_points(&[(Joint::Neck, 0.5, 0.5, 0.9)]);
        let detections = detector.detect(&blank(), &[Joint::Neck]).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[&Joint::Neck], RecognizedPoint::new(0.5, 0.5, 0.9));
    }

    #[test]
    fn test_failing_detector() {
        let mut detector = FailingDetector::new("model offline");
        let err = detector.detect(&blank(), &[]).unwrap_err();
        assert!(matches!(err, AnalyzerError::DetectionUnavailable(ref m) if m == "model offline"));
    }

    #[test]
    fn test_closure_detector() {
        let mut calls = 0;
        let mut detector = |_: &DynamicImage, joints: &[Joint]| -> Result<Detections> {
            calls += 1;
            Ok(joints
                .iter()
                .map(|&j| (j, RecognizedPoint::new(0.1, 0.2, 1.0)))
                .collect())
        };
        let detections = detector.detect(&blank(), &[Joint::Root, Joint::Neck]).unwrap();
        assert_eq!(detections.len(), 2);
        drop(detector);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_replay_detector_frames() {
        let json = r#"{"frames": [
            {"joints": {"neck": {"x": 0.5, "y": 0.8, "confidence": 0.9},
                        "rightKnee": {"x": 0.4, "y": 0.3}}},
            {"joints": {}}
        ]}"#;
        let mut detector = ReplayDetector::from_json_str(json).unwrap();
        assert_eq!(detector.remaining(), 2);

        let first = detector.detect(&blank(), &[]).unwrap();
        assert_eq!(first[&Joint::Neck], RecognizedPoint::new(0.5, 0.8, 0.9));
        assert_eq!(first[&Joint::RightKnee].confidence, 1.0);

        assert!(detector.detect(&blank(), &[]).unwrap().is_empty());
        assert!(matches!(
            detector.detect(&blank(), &[]),
            Err(AnalyzerError::DetectionUnavailable(_))
        ));
    }

    #[test]
    fn test_replay_detector_bare_list() {
        let json = r#"[{"joints": {"root": {"x": 0.5, "y": 0.5, "confidence": 0.7}}}]"#;
        let detector = ReplayDetector::from_json_str(json).unwrap();
        assert_eq!(detector.remaining(), 1);
    }

    #[test]
    fn test_replay_detector_rejects_unknown_joint() {
        let json = r#"{"frames": [{"joints": {"tail": {"x": 0.5, "y": 0.5}}}]}"#;
        assert!(matches!(
            ReplayDetector::from_json_str(json),
            Err(AnalyzerError::ParseError(_))
        ));
        assert!(ReplayDetector::from_json_str("not json").is_err());
    }

    #[test]
    fn test_keypoint_array_shape() {
        assert!(KeypointArrayDetector::new(Array2::zeros((17, 3))).is_ok());
        assert!(KeypointArrayDetector::new(Array2::zeros((17, 2))).is_ok());
        assert!(KeypointArrayDetector::new(Array2::zeros((16, 3))).is_err());
        assert!(KeypointArrayDetector::new(Array2::zeros((17, 4))).is_err());
    }

    #[test]
    fn test_keypoint_array_synthesizes_neck_and_root() {
        let mut kpts = Array2::<f32>::zeros((17, 3));
        // left/right shoulder
        kpts.row_mut(5).assign(&ndarray::arr1(&[40.0, 50.0, 0.9]));
        kpts.row_mut(6).assign(&ndarray::arr1(&[60.0, 50.0, 0.8]));
        // left/right hip
        kpts.row_mut(11).assign(&ndarray::arr1(&[45.0, 150.0, 0.7]));
        kpts.row_mut(12).assign(&ndarray::arr1(&[55.0, 150.0, 0.0]));

        let size = ImageSize::new(100, 200).unwrap();
        let detections = KeypointArrayDetector::new(kpts).unwrap().to_detections(size);

        assert_eq!(detections.len(), Joint::COUNT);
        let neck = detections[&Joint::Neck];
        assert!((neck.location.x - 0.5).abs() < 1e-9);
        assert!((neck.location.y - 0.75).abs() < 1e-9);
        assert!((neck.confidence - 0.8).abs() < f32::EPSILON);
        // Root inherits the undetected right hip's zero confidence
        assert!(detections[&Joint::Root].confidence.abs() < f32::EPSILON);
    }

    #[test]
    fn test_keypoint_batch_index() {
        let batch = Array3::<f32>::zeros((2, 17, 3));
        assert!(KeypointArrayDetector::from_batch(batch.view(), 1).is_ok());
        assert!(KeypointArrayDetector::from_batch(batch.view(), 2).is_err());
    }
}
