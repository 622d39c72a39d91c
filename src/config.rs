// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Analysis and rendering configuration.
//!
//! [`AnalyzerConfig`] controls which joints are reported and how detector
//! confidence is filtered. [`RenderConfig`] controls the skeleton overlay.
//! Both use a builder pattern.

use crate::color::Color;
use crate::skeleton::{DEFAULT_JOINTS, DRAWABLE_JOINTS, Joint};

/// Configuration for posture analysis.
///
/// # Example
///
/// ```rust
/// use vision_analyzer::{AnalyzerConfig, Joint};
///
/// let config = AnalyzerConfig::new()
///     .with_joints(vec![Joint::RightHip, Joint::RightKnee, Joint::RightAnkle])
///     .with_confidence(0.1);
/// assert_eq!(config.joints.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Joints to report, in output order. Every analysis returns exactly one
    /// observation per entry.
    pub joints: Vec<Joint>,
    /// Detections with confidence at or below this value are reported as not detected.
    pub confidence_threshold: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            joints: DEFAULT_JOINTS.to_vec(),
            confidence_threshold: 0.0,
        }
    }
}

impl AnalyzerConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ordered joint list.
    #[must_use]
    pub fn with_joints(mut self, joints: Vec<Joint>) -> Self {
        self.joints = joints;
        self
    }

    /// Set the confidence threshold.
    ///
    /// A joint is reported only when its confidence is strictly greater than
    /// `threshold`.
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }
}

/// Configuration for the skeleton overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Joints that get a marker and a bone to their parent.
    pub drawable: Vec<Joint>,
    /// Joint marker color.
    pub marker_color: Color,
    /// Marker circle stroke width in pixels.
    pub marker_stroke: u32,
    /// Marker radius is `max(width, height) / radius_divisor`.
    pub radius_divisor: u32,
    /// Bone line width in pixels.
    pub bone_width: u32,
    /// Top-left corner of the angle label.
    pub label_origin: (i32, i32),
    /// Angle label font size in pixels.
    pub label_size: f32,
    /// Angle label color.
    pub label_color: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            drawable: DRAWABLE_JOINTS.to_vec(),
            marker_color: Color::GREEN,
            marker_stroke: 2,
            radius_divisor: 200,
            bone_width: 2,
            label_origin: (60, 30),
            label_size: 32.0,
            label_color: Color::YELLOW,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the drawable joint subset.
    #[must_use]
    pub fn with_drawable(mut self, joints: Vec<Joint>) -> Self {
        self.drawable = joints;
        self
    }

    /// Set the joint marker color.
    #[must_use]
    pub const fn with_marker_color(mut self, color: Color) -> Self {
        self.marker_color = color;
        self
    }

    /// Set the bone line width in pixels.
    #[must_use]
    pub const fn with_bone_width(mut self, width: u32) -> Self {
        self.bone_width = width;
        self
    }

    /// Set the marker stroke width in pixels.
    #[must_use]
    pub const fn with_marker_stroke(mut self, width: u32) -> Self {
        self.marker_stroke = width;
        self
    }

    /// Set the label position and size.
    #[must_use]
    pub const fn with_label(mut self, origin: (i32, i32), size: f32) -> Self {
        self.label_origin = origin;
        self.label_size = size;
        self
    }

    /// Set the label color.
    #[must_use]
    pub const fn with_label_color(mut self, color: Color) -> Self {
        self.label_color = color;
        self
    }

    /// Marker radius for an image, never below one pixel.
    #[must_use]
    pub fn marker_radius(&self, width: u32, height: u32) -> i32 {
        let divisor = self.radius_divisor.max(1);
        i32::try_from(width.max(height) / divisor).unwrap_or(i32::MAX).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_config_default() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.joints, DEFAULT_JOINTS.to_vec());
        assert!(config.confidence_threshold.abs() < f32::EPSILON);
    }

    #[test]
    fn test_analyzer_config_builder() {
        let config = AnalyzerConfig::new()
            .with_joints(vec![Joint::Neck, Joint::Root])
            .with_confidence(0.3);
        assert_eq!(config.joints, vec![Joint::Neck, Joint::Root]);
        assert!((config.confidence_threshold - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_render_config_builder() {
        let config = RenderConfig::new()
            .with_drawable(vec![Joint::Neck])
            .with_marker_color(Color::WHITE)
            .with_bone_width(4)
            .with_marker_stroke(1)
            .with_label((10, 10), 16.0)
            .with_label_color(Color::RED);
        assert_eq!(config.drawable, vec![Joint::Neck]);
        assert_eq!(config.marker_color, Color::WHITE);
        assert_eq!(config.bone_width, 4);
        assert_eq!(config.marker_stroke, 1);
        assert_eq!(config.label_origin, (10, 10));
        assert_eq!(config.label_color, Color::RED);
    }

    #[test]
    fn test_marker_radius() {
        let config = RenderConfig::default();
        assert_eq!(config.marker_radius(1920, 1080), 9);
        assert_eq!(config.marker_radius(400, 800), 4);
        assert_eq!(config.marker_radius(50, 50), 1);
    }
}
