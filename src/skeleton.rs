// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Body joint identities and the fixed bone hierarchy.
//!
//! Bones form a rooted tree: every joint except [`Joint::Root`] links to
//! exactly one parent, and each link carries the color it is drawn with.
//!
//! ```text
//!                 ears ─ eyes ─ nose
//!                                │
//!   wrist ─ elbow ─ shoulder ─ neck ─ shoulder ─ elbow ─ wrist
//!                                │
//!                      hip ──── root ──── hip
//!                       │                  │
//!                     knee               knee
//!                       │                  │
//!                     ankle              ankle
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::AnalyzerError;

/// A named anatomical landmark in the pose skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    Neck,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    Root,
}

impl Joint {
    /// Number of joint identities.
    pub const COUNT: usize = 19;

    /// Every joint, in declaration order (`ALL[j.index()] == j`).
    pub const ALL: [Joint; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::Neck,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::Root,
    ];

    /// Dense table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Canonical snake_case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::Neck => "neck",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::Root => "root",
        }
    }

    /// Parent joint and bone color, see [`parent_of`].
    #[must_use]
    pub const fn parent(self) -> (Option<Joint>, Option<Color>) {
        parent_of(self)
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercase and strip `_`/`-` so `left_knee`, `left-knee` and `leftKnee` compare equal.
pub(crate) fn fold_name(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Joint {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold_name(s);
        Self::ALL
            .into_iter()
            .find(|joint| fold_name(joint.name()) == folded)
            .ok_or_else(|| AnalyzerError::ParseError(format!("Unknown joint: '{s}'")))
    }
}

/// A joint's link to its parent in the skeleton tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoneLink {
    /// The joint one step closer to [`Joint::Root`].
    pub parent: Joint,
    /// Color the bone is drawn with.
    pub color: Color,
}

const fn link(parent: Joint, color: Color) -> Option<BoneLink> {
    Some(BoneLink { parent, color })
}

/// Bone table indexed by [`Joint::index`].
///
/// Colors: face orange, trunk yellow, left leg blue, right arm cyan,
/// right leg red, left arm pink.
const BONES: [Option<BoneLink>; Joint::COUNT] = [
    link(Joint::Neck, Color::ORANGE),          // nose
    link(Joint::Nose, Color::ORANGE),          // left eye
    link(Joint::Nose, Color::ORANGE),          // right eye
    link(Joint::LeftEye, Color::ORANGE),       // left ear
    link(Joint::RightEye, Color::ORANGE),      // right ear
    link(Joint::Root, Color::YELLOW),          // neck
    link(Joint::Neck, Color::YELLOW),          // left shoulder
    link(Joint::Neck, Color::YELLOW),          // right shoulder
    link(Joint::LeftShoulder, Color::PINK),    // left elbow
    link(Joint::RightShoulder, Color::CYAN),   // right elbow
    link(Joint::LeftElbow, Color::PINK),       // left wrist
    link(Joint::RightElbow, Color::CYAN),      // right wrist
    link(Joint::Root, Color::YELLOW),          // left hip
    link(Joint::Root, Color::YELLOW),          // right hip
    link(Joint::LeftHip, Color::BLUE),         // left knee
    link(Joint::RightHip, Color::RED),         // right knee
    link(Joint::LeftKnee, Color::BLUE),        // left ankle
    link(Joint::RightKnee, Color::RED),        // right ankle
    None,                                      // root
];

/// Parent joint and bone color for `joint`.
///
/// Total over [`Joint`]; joints without a parent (only [`Joint::Root`])
/// return `(None, None)`.
#[must_use]
pub const fn parent_of(joint: Joint) -> (Option<Joint>, Option<Color>) {
    match BONES[joint.index()] {
        Some(bone) => (Some(bone.parent), Some(bone.color)),
        None => (None, None),
    }
}

/// Joint order used by the analyzer unless configured otherwise.
pub const DEFAULT_JOINTS: [Joint; Joint::COUNT] = [
    Joint::Neck,
    Joint::RightShoulder,
    Joint::RightHip,
    Joint::RightElbow,
    Joint::RightWrist,
    Joint::RightKnee,
    Joint::RightAnkle,
    Joint::Root,
    Joint::LeftHip,
    Joint::LeftShoulder,
    Joint::LeftElbow,
    Joint::LeftWrist,
    Joint::LeftKnee,
    Joint::LeftAnkle,
    Joint::Nose,
    Joint::RightEye,
    Joint::RightEar,
    Joint::LeftEye,
    Joint::LeftEar,
];

/// Joints the renderer draws unless configured otherwise.
pub const DRAWABLE_JOINTS: [Joint; Joint::COUNT] = [
    Joint::LeftAnkle,
    Joint::LeftEar,
    Joint::LeftElbow,
    Joint::LeftEye,
    Joint::LeftHip,
    Joint::LeftKnee,
    Joint::LeftShoulder,
    Joint::LeftWrist,
    Joint::Neck,
    Joint::Nose,
    Joint::RightAnkle,
    Joint::RightEar,
    Joint::RightElbow,
    Joint::RightEye,
    Joint::RightHip,
    Joint::RightKnee,
    Joint::RightShoulder,
    Joint::RightWrist,
    Joint::Root,
];

/// A bone table the renderer draws from.
///
/// [`JointCatalog::standard`] is the fixed skeleton. Links can be removed to
/// hide individual bones; they can never be added or re-parented, so every
/// catalog stays a sub-forest of the standard tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointCatalog {
    bones: [Option<BoneLink>; Joint::COUNT],
}

impl JointCatalog {
    /// The full skeleton.
    #[must_use]
    pub const fn standard() -> Self {
        Self { bones: BONES }
    }

    /// Same catalog with `joint`'s link to its parent removed.
    #[must_use]
    pub const fn without_bone(mut self, joint: Joint) -> Self {
        self.bones[joint.index()] = None;
        self
    }

    /// The bone linking `joint` to its parent, if any.
    #[must_use]
    pub const fn bone(&self, joint: Joint) -> Option<BoneLink> {
        self.bones[joint.index()]
    }

    /// Parent joint and bone color, in the same shape as [`parent_of`].
    #[must_use]
    pub const fn parent_of(&self, joint: Joint) -> (Option<Joint>, Option<Color>) {
        match self.bones[joint.index()] {
            Some(bone) => (Some(bone.parent), Some(bone.color)),
            None => (None, None),
        }
    }

    /// All `(child, link)` pairs.
    pub fn bones(&self) -> impl Iterator<Item = (Joint, BoneLink)> + '_ {
        Joint::ALL
            .into_iter()
            .filter_map(|joint| self.bone(joint).map(|bone| (joint, bone)))
    }
}

impl Default for JointCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_matches_index() {
        for (i, joint) in Joint::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i);
        }
    }

    #[test]
    fn test_parent_table() {
        let expected = [
            (Joint::Nose, Joint::Neck, Color::ORANGE),
            (Joint::RightEye, Joint::Nose, Color::ORANGE),
            (Joint::LeftEye, Joint::Nose, Color::ORANGE),
            (Joint::RightEar, Joint::RightEye, Color::ORANGE),
            (Joint::LeftEar, Joint::LeftEye, Color::ORANGE),
            (Joint::Neck, Joint::Root, Color::YELLOW),
            (Joint::LeftShoulder, Joint::Neck, Color::YELLOW),
            (Joint::RightShoulder, Joint::Neck, Color::YELLOW),
            (Joint::RightHip, Joint::Root, Color::YELLOW),
            (Joint::LeftHip, Joint::Root, Color::YELLOW),
            (Joint::LeftKnee, Joint::LeftHip, Color::BLUE),
            (Joint::LeftAnkle, Joint::LeftKnee, Color::BLUE),
            (Joint::RightElbow, Joint::RightShoulder, Color::CYAN),
            (Joint::RightWrist, Joint::RightElbow, Color::CYAN),
            (Joint::RightKnee, Joint::RightHip, Color::RED),
            (Joint::RightAnkle, Joint::RightKnee, Color::RED),
            (Joint::LeftElbow, Joint::LeftShoulder, Color::PINK),
            (Joint::LeftWrist, Joint::LeftElbow, Color::PINK),
        ];
        for (joint, parent, color) in expected {
            assert_eq!(parent_of(joint), (Some(parent), Some(color)), "{joint}");
        }
        assert_eq!(parent_of(Joint::Root), (None, None));
    }

    #[test]
    fn test_hierarchy_is_rooted_tree() {
        // Every joint reaches root without revisiting a joint
        for joint in Joint::ALL {
            let mut current = joint;
            let mut steps = 0;
            while let (Some(parent), _) = parent_of(current) {
                current = parent;
                steps += 1;
                assert!(steps <= Joint::COUNT, "cycle through {joint}");
            }
            assert_eq!(current, Joint::Root);
        }
    }

    #[test]
    fn test_joint_names_round_trip() {
        for joint in Joint::ALL {
            assert_eq!(joint.name().parse::<Joint>().unwrap(), joint);
        }
        assert_eq!("rightShoulder".parse::<Joint>().unwrap(), Joint::RightShoulder);
        assert_eq!("left-knee".parse::<Joint>().unwrap(), Joint::LeftKnee);
        assert!("tail".parse::<Joint>().is_err());
    }

    #[test]
    fn test_joint_orderings_cover_every_joint() {
        let mut default = DEFAULT_JOINTS.to_vec();
        let mut drawable = DRAWABLE_JOINTS.to_vec();
        default.sort();
        drawable.sort();
        assert_eq!(default, Joint::ALL.to_vec());
        assert_eq!(drawable, Joint::ALL.to_vec());
    }

    #[test]
    fn test_catalog_without_bone() {
        let catalog = JointCatalog::standard().without_bone(Joint::RightKnee);
        assert_eq!(catalog.bone(Joint::RightKnee), None);
        assert_eq!(catalog.parent_of(Joint::RightKnee), (None, None));
        assert_eq!(
            catalog.bone(Joint::RightAnkle).map(|b| b.parent),
            Some(Joint::RightKnee)
        );
        assert_eq!(catalog.bones().count(), Joint::COUNT - 2);
        assert_eq!(JointCatalog::default().bones().count(), Joint::COUNT - 1);
    }
}
