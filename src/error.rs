// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the posture analysis library.

use std::fmt;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Main error type for the posture analysis library.
#[derive(Debug)]
pub enum AnalyzerError {
    /// The pose detector could not produce a result for an image.
    DetectionUnavailable(String),
    /// Image width or height is zero.
    InvalidImageDimensions(u32, u32),
    /// The raster surface used for drawing could not be created.
    DrawingSurfaceFailure(String),
    /// Error decoding or encoding images.
    ImageError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Malformed joint names, posture lines or detection files.
    ParseError(String),
    /// IO error (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Video/stream processing error.
    VideoError(String),
    /// Feature not enabled.
    FeatureNotEnabled(String),
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DetectionUnavailable(msg) => write!(f, "Detection unavailable: {msg}"),
            Self::InvalidImageDimensions(w, h) => {
                write!(f, "Invalid image dimensions: {w}x{h}")
            }
            Self::DrawingSurfaceFailure(msg) => write!(f, "Drawing surface failure: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::VideoError(msg) => write!(f, "Video error: {msg}"),
            Self::FeatureNotEnabled(msg) => write!(f, "Feature not enabled: {msg}"),
        }
    }
}

impl std::error::Error for AnalyzerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for AnalyzerError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalyzerError::DetectionUnavailable("no frames".to_string());
        assert_eq!(err.to_string(), "Detection unavailable: no frames");

        let err = AnalyzerError::InvalidImageDimensions(0, 480);
        assert_eq!(err.to_string(), "Invalid image dimensions: 0x480");

        let err = AnalyzerError::DrawingSurfaceFailure("buffer".to_string());
        assert_eq!(err.to_string(), "Drawing surface failure: buffer");
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;

        let err = AnalyzerError::from(std::io::Error::other("disk"));
        assert!(err.source().is_some());
        assert!(AnalyzerError::ConfigError("x".to_string()).source().is_none());
    }
}
