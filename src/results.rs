// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Per-image analysis output.
//!
//! A [`JointObservation`] keeps "not detected" as an explicit `None`. The
//! `(0, 0)` sentinel only appears at the export boundary ([`JointObservation::value`],
//! [`ObservationRow`]), where downstream consumers expect it.

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};
use crate::geometry::Point2D;
use crate::skeleton::Joint;

/// One joint's location in one analyzed image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointObservation {
    /// Joint identity.
    pub joint: Joint,
    /// Pixel position (top-left origin), `None` when the joint was not detected.
    pub position: Option<Point2D>,
}

impl JointObservation {
    /// A detected joint.
    #[must_use]
    pub const fn detected(joint: Joint, position: Point2D) -> Self {
        Self {
            joint,
            position: Some(position),
        }
    }

    /// A joint the detector did not find.
    #[must_use]
    pub const fn missing(joint: Joint) -> Self {
        Self {
            joint,
            position: None,
        }
    }

    /// Rebuild from boundary form, treating `(0, 0)` as "not detected".
    #[must_use]
    pub fn from_value(joint: Joint, value: Point2D) -> Self {
        if value.is_zero() {
            Self::missing(joint)
        } else {
            Self::detected(joint, value)
        }
    }

    /// Whether the joint was detected.
    #[must_use]
    pub const fn is_detected(&self) -> bool {
        self.position.is_some()
    }

    /// Boundary form: the position, or `(0, 0)` if not detected.
    #[must_use]
    pub fn value(&self) -> Point2D {
        self.position.unwrap_or(Point2D::ZERO)
    }
}

/// First observation of `joint` in `observations`.
#[must_use]
pub fn find(observations: &[JointObservation], joint: Joint) -> Option<&JointObservation> {
    observations.iter().find(|o| o.joint == joint)
}

/// Boundary-form position of `joint`: `(0, 0)` when missing from the list or not detected.
#[must_use]
pub fn value_of(observations: &[JointObservation], joint: Joint) -> Point2D {
    find(observations, joint).map_or(Point2D::ZERO, JointObservation::value)
}

/// Exported `(joint, x, y)` row. `(0, 0)` means "not detected".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    /// Joint name.
    pub joint: Joint,
    /// Horizontal pixel coordinate.
    pub x: f64,
    /// Vertical pixel coordinate.
    pub y: f64,
}

impl From<&JointObservation> for ObservationRow {
    fn from(observation: &JointObservation) -> Self {
        let value = observation.value();
        Self {
            joint: observation.joint,
            x: value.x,
            y: value.y,
        }
    }
}

impl From<&ObservationRow> for JointObservation {
    fn from(row: &ObservationRow) -> Self {
        Self::from_value(row.joint, Point2D::new(row.x, row.y))
    }
}

/// Export rows in observation order.
#[must_use]
pub fn to_rows(observations: &[JointObservation]) -> Vec<ObservationRow> {
    observations.iter().map(ObservationRow::from).collect()
}

/// Analysis record for one frame of a source, as written by the exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Frame index within the source.
    pub frame: usize,
    /// Source path or identifier.
    pub path: String,
    /// Measured posture angle, if a line was requested.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub angle: Option<f64>,
    /// Joint rows.
    pub joints: Vec<ObservationRow>,
}

impl FrameRecord {
    /// Build a record from analyzer output.
    #[must_use]
    pub fn new(
        frame: usize,
        path: impl Into<String>,
        observations: &[JointObservation],
        angle: Option<f64>,
    ) -> Self {
        Self {
            frame,
            path: path.into(),
            angle,
            joints: to_rows(observations),
        }
    }
}

/// Export format, chosen from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON array of [`FrameRecord`]s.
    Json,
    /// `frame,path,angle,joint,x,y` rows with a header. `angle` is empty when not measured.
    Csv,
}

impl ExportFormat {
    /// Pick a format from a path's extension (`.json` or `.csv`).
    ///
    /// # Errors
    ///
    /// Returns a config error for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(AnalyzerError::ConfigError(format!(
                "Unsupported export format '{}': use .json or .csv",
                path.display()
            ))),
        }
    }
}

/// Serialize frame records as CSV.
#[must_use]
pub fn records_to_csv(records: &[FrameRecord]) -> String {
    let mut out = String::from("frame,path,angle,joint,x,y\n");
    for record in records {
        let angle = record.angle.map(|a| a.to_string()).unwrap_or_default();
        for row in &record.joints {
            // Writing into a String cannot fail
            let _ = writeln!(
                out,
                "{},{},{angle},{},{},{}",
                record.frame,
                csv_field(&record.path),
                row.joint,
                row.x,
                row.y
            );
        }
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write frame records to `path` in the format implied by its extension.
///
/// # Errors
///
/// Returns an error for unsupported extensions, serialization failures or IO errors.
pub fn export_records(path: &Path, records: &[FrameRecord]) -> Result<()> {
    let contents = match ExportFormat::from_path(path)? {
        ExportFormat::Json => serde_json::to_string_pretty(records)?,
        ExportFormat::Csv => records_to_csv(records),
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            AnalyzerError::IoError(format!("Failed to create directory {}: {e}", parent.display()))
        })?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<JointObservation> {
        vec![
            JointObservation::detected(Joint::Neck, Point2D::new(10.0, 20.0)),
            JointObservation::missing(Joint::Root),
        ]
    }

    #[test]
    fn test_sentinel_boundary() {
        let obs = sample();
        assert_eq!(obs[0].value(), Point2D::new(10.0, 20.0));
        assert_eq!(obs[1].value(), Point2D::ZERO);
        assert!(!obs[1].is_detected());

        let back = JointObservation::from_value(Joint::Root, Point2D::ZERO);
        assert_eq!(back, JointObservation::missing(Joint::Root));
    }

    #[test]
    fn test_lookup() {
        let obs = sample();
        assert_eq!(value_of(&obs, Joint::Neck), Point2D::new(10.0, 20.0));
        assert_eq!(value_of(&obs, Joint::Root), Point2D::ZERO);
        assert_eq!(value_of(&obs, Joint::LeftKnee), Point2D::ZERO);
        assert!(find(&obs, Joint::LeftKnee).is_none());
    }

    #[test]
    fn test_rows_keep_order() {
        let rows = to_rows(&sample());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].joint, Joint::Neck);
        assert_eq!((rows[1].x, rows[1].y), (0.0, 0.0));
        assert_eq!(JointObservation::from(&rows[1]), JointObservation::missing(Joint::Root));
    }

    #[test]
    fn test_json_row_shape() {
        let json = serde_json::to_string(&to_rows(&sample())[0]).unwrap();
        assert_eq!(json, r#"{"joint":"neck","x":10.0,"y":20.0}"#);
    }

    #[test]
    fn test_csv_export() {
        let records = vec![
            FrameRecord::new(3, "clip, take 2.mp4", &sample(), Some(12.5)),
            FrameRecord::new(4, "clip, take 2.mp4", &sample()[..1], None),
        ];
        let csv = records_to_csv(&records);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "frame,path,angle,joint,x,y");
        assert_eq!(lines[1], "3,\"clip, take 2.mp4\",12.5,neck,10,20");
        assert_eq!(lines[2], "3,\"clip, take 2.mp4\",12.5,root,0,0");
        assert_eq!(lines[3], "4,\"clip, take 2.mp4\",,neck,10,20");
    }

    #[test]
    fn test_export_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("a.JSON")).unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out/a.csv")).unwrap(), ExportFormat::Csv);
        assert!(ExportFormat::from_path(Path::new("a.txt")).is_err());
    }

    #[test]
    fn test_export_records_writes_json() {
        let path = std::env::temp_dir()
            .join(format!("vision-analyzer-export-{}", std::process::id()))
            .join("frames.json");
        let records = vec![FrameRecord::new(0, "a.jpg", &sample(), None)];
        export_records(&path, &records).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<FrameRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, records);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
