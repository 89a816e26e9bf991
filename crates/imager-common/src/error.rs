//! Error types for navigation and calibration.

use thiserror::Error;

/// Result type alias using ImagerError.
pub type ImagerResult<T> = Result<T, ImagerError>;

/// Primary error type for the navigation and calibration engine.
///
/// Every variant is a deterministic failure of a pure computation or of the
/// attribute lookup feeding it; none of them is worth retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImagerError {
    // === Geometry Errors ===
    #[error("Resolution '{resolution}' is not supported by {instrument}")]
    UnsupportedResolution {
        instrument: String,
        resolution: String,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Degenerate area extent ({x_min}, {y_min}, {x_max}, {y_max})")]
    DegenerateExtent {
        x_min: f64,
        y_min: f64,
        x_max: f64,
        y_max: f64,
    },

    #[error("Point ({x}, {y}) is not on the visible disk")]
    OffDisk { x: f64, y: f64 },

    // === Calibration Errors ===
    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    // === Attribute Errors ===
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Malformed attribute '{key}': {message}")]
    MalformedAttribute { key: String, message: String },

    #[error("Unknown band: {0}")]
    UnknownBand(String),
}

impl ImagerError {
    /// Shorthand for a `MalformedAttribute` error.
    pub fn malformed(key: impl Into<String>, message: impl Into<String>) -> Self {
        ImagerError::MalformedAttribute {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether the error invalidates geolocation for a whole resolution.
    ///
    /// Bands of a resolution whose area failed must not be emitted.
    pub fn is_geometry_error(&self) -> bool {
        matches!(
            self,
            ImagerError::UnsupportedResolution { .. }
                | ImagerError::InvalidGeometry(_)
                | ImagerError::DegenerateExtent { .. }
                | ImagerError::OffDisk { .. }
        )
    }
}

impl From<serde_json::Error> for ImagerError {
    fn from(err: serde_json::Error) -> Self {
        ImagerError::malformed("<json>", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_classification() {
        assert!(ImagerError::InvalidGeometry("a <= b".into()).is_geometry_error());
        assert!(ImagerError::OffDisk { x: 0.0, y: 0.0 }.is_geometry_error());
        assert!(!ImagerError::KeyNotFound("/attr/RegWidth".into()).is_geometry_error());
        assert!(!ImagerError::InvalidCalibration("empty LUT".into()).is_geometry_error());
    }

    #[test]
    fn test_display() {
        let err = ImagerError::UnsupportedResolution {
            instrument: "GHI".into(),
            resolution: "4000m".into(),
        };
        assert_eq!(err.to_string(), "Resolution '4000m' is not supported by GHI");
    }
}
