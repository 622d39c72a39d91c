// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! RGBA colors used for bones, joint markers and labels.

use image::{Rgb, Rgba};

/// Color type for visualization, stored as straight (non-premultiplied) RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    /// Head and face bones (#ff9300).
    pub const ORANGE: Color = Color(255, 147, 0, 255);
    /// Trunk bones (#ffff00). Also the angle label color.
    pub const YELLOW: Color = Color(255, 255, 0, 255);
    /// Left leg bones (#007aff).
    pub const BLUE: Color = Color(0, 122, 255, 255);
    /// Right arm bones (#00fdff).
    pub const CYAN: Color = Color(0, 253, 255, 255);
    /// Right leg bones (#ff2600).
    pub const RED: Color = Color(255, 38, 0, 255);
    /// Left arm bones (#e87aa4).
    pub const PINK: Color = Color(232, 122, 164, 255);
    /// Joint marker color.
    pub const GREEN: Color = Color(0, 255, 0, 255);
    /// Fallback bone color.
    pub const WHITE: Color = Color(255, 255, 255, 255);

    /// As an `image` RGBA pixel.
    #[must_use]
    pub const fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.0, self.1, self.2, self.3])
    }

    /// As an `image` RGB pixel, dropping alpha.
    #[must_use]
    pub const fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.0, self.1, self.2])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_values() {
        assert_eq!(Color::ORANGE.to_rgba(), Rgba([255, 147, 0, 255]));
        assert_eq!(Color::CYAN.to_rgb(), Rgb([0, 253, 255]));
        assert_eq!(Color::default(), Color::WHITE);
    }

    #[test]
    fn test_pixel_conversion() {
        assert_eq!(Color::PINK.to_rgba(), Rgba([232, 122, 164, 255]));
        assert_eq!(Color::PINK.to_rgb(), Rgb([232, 122, 164]));
    }
}
