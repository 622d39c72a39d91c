// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Planar geometry for posture measurement.
//!
//! Two coordinate spaces meet here:
//!
//! - **detector space**: normalized to `[0, 1]` on both axes, origin at the
//!   bottom-left corner, y growing upwards.
//! - **image space**: pixels, origin at the top-left corner, y growing downwards.
//!
//! [`to_image_space`] converts from the first to the second. All other
//! functions are plain Euclidean helpers working in whichever space the
//! caller supplies.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};

/// A point in either detector or image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point2D {
    /// The origin. Doubles as the "not detected" value at export boundaries.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether this is exactly `(0, 0)`.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        distance(self, other)
    }

    /// Copy of this point with `y` replaced by 0.
    ///
    /// Used to build a vertical reference ray through a joint.
    #[must_use]
    pub const fn with_zero_y(self) -> Self {
        Self { x: self.x, y: 0.0 }
    }

    /// Midpoint between two points.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Validated pixel dimensions of an image. Both sides are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    width: u32,
    height: u32,
}

impl ImageSize {
    /// Create a size, rejecting zero-width or zero-height images.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::InvalidImageDimensions`] if either side is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AnalyzerError::InvalidImageDimensions(width, height));
        }
        Ok(Self { width, height })
    }

    /// Size of an image buffer.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::InvalidImageDimensions`] for an empty image.
    pub fn of(image: &image::DynamicImage) -> Result<Self> {
        Self::new(image.width(), image.height())
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(self) -> u32 {
        self.height
    }

    /// The longer side, in pixels.
    #[must_use]
    pub const fn max_side(self) -> u32 {
        if self.width > self.height {
            self.width
        } else {
            self.height
        }
    }
}

/// Map a normalized detector-space point into image pixel space.
///
/// `x' = x * width`, `y' = (1 - y) * height`. The vertical flip moves the
/// origin from bottom-left to top-left. No rounding is applied.
#[must_use]
pub fn to_image_space(normalized: Point2D, size: ImageSize) -> Point2D {
    let width = f64::from(size.width);
    let height = f64::from(size.height);
    Point2D::new(normalized.x * width, (1.0 - normalized.y) * height)
}

/// Inverse of [`to_image_space`].
#[must_use]
pub fn to_detector_space(pixel: Point2D, size: ImageSize) -> Point2D {
    let width = f64::from(size.width);
    let height = f64::from(size.height);
    Point2D::new(pixel.x / width, 1.0 - pixel.y / height)
}

/// Euclidean distance between two points.
///
/// Returned as a real number; callers that want whole pixels truncate.
#[must_use]
pub fn distance(a: Point2D, b: Point2D) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Direction of the ray `origin → target` in radians, in `(-π, π]`.
#[must_use]
pub fn radian(origin: Point2D, target: Point2D) -> f64 {
    (target.y - origin.y).atan2(target.x - origin.x)
}

/// Convert radians to degrees.
#[must_use]
pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Convert degrees to radians.
#[must_use]
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Signed angle ∠ABC in degrees, swept from ray `B → A` to ray `B → C`.
///
/// ```text
/// angle = (atan2(C.y - B.y, C.x - B.x) - atan2(A.y - B.y, A.x - B.x)) * 180 / π
/// ```
///
/// The result lies in `(-360, 360)` and is not normalized. Coincident points
/// are not an error: `atan2(0, 0)` is 0, so degenerate input yields a
/// well-defined (if meaningless) angle.
///
/// # Examples
///
/// ```rust
/// use vision_analyzer::geometry::{three_point_angle, Point2D};
///
/// let a = Point2D::new(1.0, 0.0);
/// let b = Point2D::new(0.0, 0.0);
/// let c = Point2D::new(0.0, 1.0);
/// assert!((three_point_angle(a, b, c) - 90.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn three_point_angle(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    radians_to_degrees(radian(b, c) - radian(b, a))
}

/// Fold an angle in degrees into `[0, 360)`.
///
/// Never applied implicitly; posture lines keep their raw signed values.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let folded = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if folded >= 360.0 { 0.0 } else { folded }
}
