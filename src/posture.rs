// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Named posture lines.
//!
//! A posture line is a three-point angle over fixed joints plus a fixed
//! post-transform. The definitions live in one table ([`PostureLine::definition`])
//! so each formula can be read and tested on its own.
//!
//! | line             | start                 | vertex        | end           | transform   |
//! |------------------|-----------------------|---------------|---------------|-------------|
//! | `ForwardLine`    | `(root.x, 0)`         | `root`        | `neck`        | plain       |
//! | `CenterLine`     | `(root.x, 0)`         | `root`        | `neck`        | plain       |
//! | `RightLine`      | `(right_ankle.x, 0)`  | `right_ankle` | `right_hip`   | plain       |
//! | `LeftLine`       | `(left_ankle.x, 0)`   | `left_ankle`  | `right_hip`   | negated     |
//! | `RightKneeAngle` | `right_hip`           | `right_knee`  | `right_ankle` | minus 180°  |
//! | `LeftKneeAngle`  | `left_hip`            | `left_knee`   | `left_ankle`  | minus 180°  |

use std::fmt;
use std::str::FromStr;

use crate::error::AnalyzerError;
use crate::geometry::{Point2D, three_point_angle};
use crate::results::{JointObservation, value_of};
use crate::skeleton::{Joint, fold_name};

/// How a line's start point is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The joint's own position.
    Joint(Joint),
    /// The joint's x with y forced to 0: a vertical reference through the joint.
    Vertical(Joint),
}

impl Anchor {
    fn resolve(self, observations: &[JointObservation]) -> Point2D {
        match self {
            Self::Joint(joint) => value_of(observations, joint),
            Self::Vertical(joint) => value_of(observations, joint).with_zero_y(),
        }
    }
}

/// Adjustment applied to the raw three-point angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleTransform {
    /// Raw angle.
    Plain,
    /// Raw angle minus 180°.
    Minus180,
    /// Raw angle with its sign flipped.
    Negated,
}

impl AngleTransform {
    /// Apply the transform to a raw angle in degrees.
    #[must_use]
    pub fn apply(self, degrees: f64) -> f64 {
        match self {
            Self::Plain => degrees,
            Self::Minus180 => degrees - 180.0,
            Self::Negated => -degrees,
        }
    }
}

/// Definition row of a posture line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDefinition {
    /// Start point (ray `vertex → start` is the angle's first side).
    pub start: Anchor,
    /// Vertex joint.
    pub vertex: Joint,
    /// End joint (ray `vertex → end` is the angle's second side).
    pub end: Joint,
    /// Post-transform.
    pub transform: AngleTransform,
}

const fn row(
    start: Anchor,
    vertex: Joint,
    end: Joint,
    transform: AngleTransform,
) -> LineDefinition {
    LineDefinition {
        start,
        vertex,
        end,
        transform,
    }
}

/// A named posture measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostureLine {
    /// Forward lean of the trunk against vertical.
    ForwardLine,
    /// Spine tilt against vertical.
    CenterLine,
    /// Right hip movement, measured from the right ankle.
    RightLine,
    /// Left side hip movement, measured from the left ankle.
    LeftLine,
    /// Right knee flexion.
    RightKneeAngle,
    /// Left knee flexion.
    LeftKneeAngle,
}

impl PostureLine {
    /// Every posture line.
    pub const ALL: [PostureLine; 6] = [
        Self::ForwardLine,
        Self::CenterLine,
        Self::RightLine,
        Self::LeftLine,
        Self::RightKneeAngle,
        Self::LeftKneeAngle,
    ];

    /// The line's `(start, vertex, end, transform)` definition.
    #[must_use]
    pub const fn definition(self) -> LineDefinition {
        use AngleTransform::{Minus180, Negated, Plain};
        use Joint::{
            LeftAnkle, LeftHip, LeftKnee, Neck, RightAnkle, RightHip, RightKnee, Root,
        };

        match self {
            Self::ForwardLine | Self::CenterLine => {
                row(Anchor::Vertical(Root), Root, Neck, Plain)
            }
            Self::RightLine => row(Anchor::Vertical(RightAnkle), RightAnkle, RightHip, Plain),
            // Ends at the right hip, not the left one
            Self::LeftLine => row(Anchor::Vertical(LeftAnkle), LeftAnkle, RightHip, Negated),
            Self::RightKneeAngle => row(Anchor::Joint(RightHip), RightKnee, RightAnkle, Minus180),
            Self::LeftKneeAngle => row(Anchor::Joint(LeftHip), LeftKnee, LeftAnkle, Minus180),
        }
    }

    /// Kebab-case name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ForwardLine => "forward-line",
            Self::CenterLine => "center-line",
            Self::RightLine => "right-line",
            Self::LeftLine => "left-line",
            Self::RightKneeAngle => "right-knee-angle",
            Self::LeftKneeAngle => "left-knee-angle",
        }
    }

    /// Measure this line over `observations`.
    ///
    /// Joints are looked up by first match. A joint that is missing or was not
    /// detected resolves to `(0, 0)`; the resulting angle is degenerate but
    /// never an error.
    #[must_use]
    pub fn measure(self, observations: &[JointObservation]) -> f64 {
        let def = self.definition();
        let start = def.start.resolve(observations);
        let vertex = value_of(observations, def.vertex);
        let end = value_of(observations, def.end);
        def.transform.apply(three_point_angle(start, vertex, end))
    }

    /// Whether every joint the line reads was detected.
    #[must_use]
    pub fn is_measurable(self, observations: &[JointObservation]) -> bool {
        let def = self.definition();
        let start = match def.start {
            Anchor::Joint(joint) | Anchor::Vertical(joint) => joint,
        };
        [start, def.vertex, def.end].into_iter().all(|joint| {
            observations
                .iter()
                .find(|o| o.joint == joint)
                .is_some_and(JointObservation::is_detected)
        })
    }
}

impl fmt::Display for PostureLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PostureLine {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold_name(s);
        Self::ALL
            .into_iter()
            .find(|line| fold_name(line.name()) == folded)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|l| l.name()).collect();
                AnalyzerError::ParseError(format!(
                    "Unknown posture line '{s}', expected one of: {}",
                    names.join(", ")
                ))
            })
    }
}

/// Measure `line` over `observations`. See [`PostureLine::measure`].
#[must_use]
pub fn measure_angle(observations: &[JointObservation], line: PostureLine) -> f64 {
    line.measure(observations)
}

/// Round to one decimal place, as shown in the overlay label.
#[must_use]
pub fn round_to_tenth(degrees: f64) -> f64 {
    (degrees * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn obs(items: &[(Joint, f64, f64)]) -> Vec<JointObservation> {
        items
            .iter()
            .map(|&(j, x, y)| JointObservation::from_value(j, Point2D::new(x, y)))
            .collect()
    }

    #[test]
    fn test_right_knee_scenario() {
        let observations = obs(&[
            (Joint::RightHip, 100.0, 100.0),
            (Joint::RightKnee, 100.0, 150.0),
            (Joint::RightAnkle, 120.0, 200.0),
        ]);
        let expected = (50.0f64.atan2(20.0) - (-50.0f64).atan2(0.0)).to_degrees() - 180.0;
        let angle = measure_angle(&observations, PostureLine::RightKneeAngle);
        assert!((angle - expected).abs() < EPS);
        assert!((angle - -21.801_409_486_351_81).abs() < 1e-9);
    }

    #[test]
    fn test_straight_leg_is_zero() {
        let observations = obs(&[
            (Joint::LeftHip, 50.0, 100.0),
            (Joint::LeftKnee, 50.0, 150.0),
            (Joint::LeftAnkle, 50.0, 200.0),
        ]);
        // Straight down: 90 - (-90) - 180 == 0
        let angle = PostureLine::LeftKneeAngle.measure(&observations);
        assert!(angle.abs() < EPS);
    }

    #[test]
    fn test_forward_line_uses_vertical_reference() {
        // Neck directly above root: reference ray and neck ray both point up
        let observations = obs(&[(Joint::Root, 200.0, 400.0), (Joint::Neck, 200.0, 100.0)]);
        assert!(PostureLine::ForwardLine.measure(&observations).abs() < EPS);

        // Neck leaning right by 45°
        let observations = obs(&[(Joint::Root, 200.0, 400.0), (Joint::Neck, 300.0, 300.0)]);
        let angle = PostureLine::ForwardLine.measure(&observations);
        assert!((angle - 45.0).abs() < EPS);
        assert!((PostureLine::CenterLine.measure(&observations) - angle).abs() < EPS);
    }

    #[test]
    fn test_left_line_is_negated_and_ends_at_right_hip() {
        let observations = obs(&[
            (Joint::LeftAnkle, 100.0, 400.0),
            (Joint::RightHip, 200.0, 300.0),
            (Joint::LeftHip, 0.0, 300.0),
        ]);
        let raw = three_point_angle(
            Point2D::new(100.0, 0.0),
            Point2D::new(100.0, 400.0),
            Point2D::new(200.0, 300.0),
        );
        let angle = PostureLine::LeftLine.measure(&observations);
        assert!((angle + raw).abs() < EPS);
        assert!((angle + 45.0).abs() < EPS);
    }

    #[test]
    fn test_right_line() {
        let observations = obs(&[(Joint::RightAnkle, 100.0, 400.0), (Joint::RightHip, 50.0, 350.0)]);
        let angle = PostureLine::RightLine.measure(&observations);
        assert!((angle - -45.0).abs() < EPS);
    }

    #[test]
    fn test_missing_joints_are_degenerate_not_errors() {
        let angle = PostureLine::RightKneeAngle.measure(&[]);
        assert!((angle - -180.0).abs() < EPS);
        assert!(angle.is_finite());
        assert!(!PostureLine::RightKneeAngle.is_measurable(&[]));
    }

    #[test]
    fn test_first_match_wins() {
        let observations = obs(&[
            (Joint::Root, 200.0, 400.0),
            (Joint::Neck, 200.0, 100.0),
            (Joint::Neck, 300.0, 300.0),
        ]);
        assert!(PostureLine::ForwardLine.measure(&observations).abs() < EPS);
        assert!(PostureLine::ForwardLine.is_measurable(&observations));
    }

    #[test]
    fn test_line_names() {
        for line in PostureLine::ALL {
            assert_eq!(line.name().parse::<PostureLine>().unwrap(), line);
        }
        assert_eq!("RightKneeAngle".parse::<PostureLine>().unwrap(), PostureLine::RightKneeAngle);
        assert_eq!("left_line".parse::<PostureLine>().unwrap(), PostureLine::LeftLine);
        assert!("neck-angle".parse::<PostureLine>().is_err());
    }

    #[test]
    fn test_round_to_tenth() {
        assert!((round_to_tenth(-21.801_409) - -21.8).abs() < EPS);
        assert!((round_to_tenth(158.26) - 158.3).abs() < EPS);
        assert!((round_to_tenth(12.345) - 12.3).abs() < EPS);
    }
}
