// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Posture analysis: detector output in, ordered joint observations out.

use std::fmt;

use image::DynamicImage;

use crate::config::AnalyzerConfig;
use crate::detector::{Detections, Detector};
use crate::error::Result;
use crate::geometry::{ImageSize, to_image_space};
use crate::posture::PostureLine;
use crate::results::JointObservation;
use crate::{trace_phase, warn};

/// Phase of a single analysis call.
///
/// Phases are traced at debug verbosity and never stored between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    /// Waiting for an image.
    Idle,
    /// The detector is running.
    Detecting,
    /// Observations have been produced.
    Processed,
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Detecting => "detecting",
            Self::Processed => "processed",
        };
        f.write_str(name)
    }
}

/// Turns detector output into pixel-space joint observations.
///
/// The analyzer holds configuration only. Every call returns a fresh vector,
/// so one analyzer can be shared across threads.
///
/// # Example
///
/// ```rust
/// use image::DynamicImage;
/// use vision_analyzer::{AnalyzerConfig, Joint, PostureAnalyzer, StaticDetector};
///
/// let analyzer = PostureAnalyzer::new(AnalyzerConfig::default());
/// let mut detector = StaticDetector::from_points(&[(Joint::Neck, 0.5, 0.75, 0.9)]);
/// let image = DynamicImage::new_rgb8(200, 100);
///
/// let observations = analyzer.analyze(&image, &mut detector);
/// assert_eq!(observations.len(), Joint::COUNT);
/// assert_eq!(observations[0].value().x, 100.0);
/// assert_eq!(observations[0].value().y, 25.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PostureAnalyzer {
    config: AnalyzerConfig,
}

impl PostureAnalyzer {
    /// Create an analyzer.
    #[must_use]
    pub const fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// The analyzer's configuration.
    #[must_use]
    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one image.
    ///
    /// Failures are logged and produce an empty vector, never partial results.
    /// Use [`Self::try_analyze`] to receive the error instead.
    pub fn analyze<D>(&self, image: &DynamicImage, detector: &mut D) -> Vec<JointObservation>
    where
        D: Detector + ?Sized,
    {
        match self.try_analyze(image, detector) {
            Ok(observations) => observations,
            Err(e) => {
                warn!("Posture analysis skipped: {e}");
                Vec::new()
            }
        }
    }

    /// Analyze one image, returning detector and dimension errors.
    ///
    /// # Errors
    ///
    /// - [`crate::AnalyzerError::InvalidImageDimensions`] for an empty image.
    /// - [`crate::AnalyzerError::DetectionUnavailable`] if the detector fails.
    pub fn try_analyze<D>(
        &self,
        image: &DynamicImage,
        detector: &mut D,
    ) -> Result<Vec<JointObservation>>
    where
        D: Detector + ?Sized,
    {
        trace_phase!("{}", AnalysisPhase::Idle);
        let size = ImageSize::of(image)?;

        trace_phase!(
            "{} {} joints on {}x{}",
            AnalysisPhase::Detecting,
            self.config.joints.len(),
            size.width(),
            size.height()
        );
        let detections = detector.detect(image, &self.config.joints)?;

        let observations = self.process_detections(&detections, size);
        trace_phase!(
            "{} {}/{} joints detected",
            AnalysisPhase::Processed,
            observations.iter().filter(|o| o.is_detected()).count(),
            observations.len()
        );
        Ok(observations)
    }

    /// Map raw detections into image space.
    ///
    /// Emits exactly one observation per configured joint, in configured
    /// order. A joint that is absent, whose confidence is not strictly above
    /// the threshold, or that maps onto the `(0, 0)` pixel is reported as not
    /// detected.
    #[must_use]
    pub fn process_detections(
        &self,
        detections: &Detections,
        size: ImageSize,
    ) -> Vec<JointObservation> {
        let threshold = self.config.confidence_threshold;
        self.config
            .joints
            .iter()
            .map(|&joint| match detections.get(&joint) {
                Some(point) if point.confidence > threshold => {
                    JointObservation::from_value(joint, to_image_space(point.location, size))
                }
                _ => JointObservation::missing(joint),
            })
            .collect()
    }

    /// Measure a posture line over `observations`.
    #[must_use]
    pub fn measure_angle(&self, observations: &[JointObservation], line: PostureLine) -> f64 {
        line.measure(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{FailingDetector, RecognizedPoint, StaticDetector};
    use crate::error::AnalyzerError;
    use crate::geometry::Point2D;
    use crate::skeleton::{DEFAULT_JOINTS, Joint};

    fn size(w: u32, h: u32) -> ImageSize {
        ImageSize::new(w, h).unwrap()
    }

    #[test]
    fn test_output_matches_configured_joints() {
        let analyzer = PostureAnalyzer::default();
        let observations = analyzer.process_detections(&Detections::new(), size(10, 10));
        assert_eq!(observations.len(), DEFAULT_JOINTS.len());
        for (obs, joint) in observations.iter().zip(DEFAULT_JOINTS) {
            assert_eq!(obs.joint, joint);
            assert!(!obs.is_detected());
        }
    }

    #[test]
    fn test_custom_joint_order() {
        let joints = vec![Joint::RightAnkle, Joint::Neck, Joint::RightAnkle];
        let analyzer = PostureAnalyzer::new(AnalyzerConfig::new().with_joints(joints.clone()));
        let observations = analyzer.process_detections(&Detections::new(), size(10, 10));
        let names: Vec<Joint> = observations.iter().map(|o| o.joint).collect();
        assert_eq!(names, joints);
    }

    #[test]
    fn test_maps_into_image_space() {
        let analyzer = PostureAnalyzer::default();
        let mut detections = Detections::new();
        detections.insert(Joint::RightKnee, RecognizedPoint::new(0.25, 0.25, 0.8));

        let observations = analyzer.process_detections(&detections, size(400, 200));
        let knee = observations.iter().find(|o| o.joint == Joint::RightKnee).unwrap();
        assert_eq!(knee.position, Some(Point2D::new(100.0, 150.0)));
    }

    #[test]
    fn test_zero_confidence_is_reported_as_sentinel() {
        let analyzer = PostureAnalyzer::default();
        let mut detections = Detections::new();
        detections.insert(Joint::Neck, RecognizedPoint::new(0.5, 0.5, 0.0));
        detections.insert(Joint::Root, RecognizedPoint::new(0.5, 0.5, -1.0));

        let observations = analyzer.process_detections(&detections, size(100, 100));
        assert_eq!(observations.len(), DEFAULT_JOINTS.len());
        for joint in [Joint::Neck, Joint::Root] {
            let obs = observations.iter().find(|o| o.joint == joint).unwrap();
            assert_eq!(obs.value(), Point2D::ZERO);
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let analyzer = PostureAnalyzer::new(
            AnalyzerConfig::new()
                .with_joints(vec![Joint::Neck])
                .with_confidence(0.5),
        );
        let mut detections = Detections::new();
        detections.insert(Joint::Neck, RecognizedPoint::new(0.5, 0.5, 0.5));
        assert!(!analyzer.process_detections(&detections, size(10, 10))[0].is_detected());

        detections.insert(Joint::Neck, RecognizedPoint::new(0.5, 0.5, 0.51));
        assert!(analyzer.process_detections(&detections, size(10, 10))[0].is_detected());
    }

    #[test]
    fn test_origin_pixel_is_not_detected() {
        let analyzer = PostureAnalyzer::new(
            AnalyzerConfig::new().with_joints(vec![Joint::RightHip, Joint::RightKnee]),
        );
        let mut detections = Detections::new();
        detections.insert(Joint::RightHip, RecognizedPoint::new(0.0, 1.0, 0.9));
        detections.insert(Joint::RightKnee, RecognizedPoint::new(0.0, 0.0, 0.9));

        let observations = analyzer.process_detections(&detections, size(200, 200));
        assert_eq!(observations[0], JointObservation::missing(Joint::RightHip));
        assert_eq!(observations[1].position, Some(Point2D::new(0.0, 200.0)));
    }

    #[test]
    fn test_failing_detector_yields_empty() {
        let analyzer = PostureAnalyzer::default();
        let image = DynamicImage::new_rgb8(32, 32);
        let mut detector = FailingDetector::new("offline");

        assert!(analyzer.analyze(&image, &mut detector).is_empty());
        assert!(matches!(
            analyzer.try_analyze(&image, &mut detector),
            Err(AnalyzerError::DetectionUnavailable(_))
        ));
    }

    #[test]
    fn test_zero_sized_image() {
        let analyzer = PostureAnalyzer::default();
        let image = DynamicImage::new_rgb8(0, 10);
        let mut detector = StaticDetector::default();

        assert!(analyzer.analyze(&image, &mut detector).is_empty());
        assert!(matches!(
            analyzer.try_analyze(&image, &mut detector),
            Err(AnalyzerError::InvalidImageDimensions(0, 10))
        ));
    }

    #[test]
    fn test_analyze_then_measure() {
        let analyzer = PostureAnalyzer::default();
        let image = DynamicImage::new_rgb8(100, 100);
        // Pixel (100,100),(100,150),(120,200) on a 1000x1000 frame
        let mut detector = StaticDetector::from_points(&[
            (Joint::RightHip, 0.1, 0.9, 1.0),
            (Joint::RightKnee, 0.1, 0.85, 1.0),
            (Joint::RightAnkle, 0.12, 0.8, 1.0),
        ]);
        let observations = analyzer.analyze(&image, &mut detector);
        let angle = analyzer.measure_angle(&observations, PostureLine::RightKneeAngle);
        assert!((angle - -21.801_409_486_351_81).abs() < 1e-6);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(AnalysisPhase::Detecting.to_string(), "detecting");
    }
}
