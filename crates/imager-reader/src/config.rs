//! Reader configuration.

use std::path::Path;

use projection::{AreaOptions, CornerConvention, CornerRule, Instrument, ScanDirection};
use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, Result};

/// How area extents are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtentSource {
    /// Corners for GHI, scan geometry for AGRI.
    #[default]
    Auto,
    /// Project the four corner attributes.
    Corners,
    /// Use the fixed-grid window given by the begin/end line and pixel numbers.
    ScanGeometry,
}

impl ExtentSource {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "corners" => Some(Self::Corners),
            "scan_geometry" | "scan-geometry" => Some(Self::ScanGeometry),
            _ => None,
        }
    }

    /// Resolve `Auto` for an instrument.
    pub fn resolve(self, instrument: Instrument) -> Self {
        match (self, instrument) {
            (Self::Auto, Instrument::Ghi) => Self::Corners,
            (Self::Auto, Instrument::Agri) => Self::ScanGeometry,
            (other, _) => other,
        }
    }
}

/// What to do when one band of a file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log and leave the band out.
    #[default]
    SkipBand,
    /// Fail the whole file.
    AbortFile,
}

impl FailurePolicy {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "skip_band" | "skip" => Some(Self::SkipBand),
            "abort_file" | "abort" => Some(Self::AbortFile),
            _ => None,
        }
    }
}

/// Configuration for the band orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// What the corner attributes refer to.
    pub corner_convention: CornerConvention,

    /// How the extent is picked from projected corners.
    pub corner_rule: CornerRule,

    /// Corner- or scan-geometry-based extents.
    pub extent_source: ExtentSource,

    /// Line order for scan-geometry extents.
    pub scan_direction: ScanDirection,

    /// Per-band failure handling in batch loads.
    pub failure_policy: FailurePolicy,
}

impl ReaderConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults; unrecognised values are errors.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("IMAGER_CORNER_CONVENTION") {
            config.corner_convention = match val.to_lowercase().as_str() {
                "edges" => CornerConvention::Edges,
                "centers" | "centres" => CornerConvention::Centers,
                _ => return Err(invalid("IMAGER_CORNER_CONVENTION", &val)),
            };
        }

        if let Ok(val) = std::env::var("IMAGER_CORNER_RULE") {
            config.corner_rule = match val.to_lowercase().as_str() {
                "positional" => CornerRule::Positional,
                "min_max" | "minmax" => CornerRule::MinMax,
                _ => return Err(invalid("IMAGER_CORNER_RULE", &val)),
            };
        }

        if let Ok(val) = std::env::var("IMAGER_EXTENT_SOURCE") {
            config.extent_source = ExtentSource::from_str(&val)
                .ok_or_else(|| invalid("IMAGER_EXTENT_SOURCE", &val))?;
        }

        if let Ok(val) = std::env::var("IMAGER_FAILURE_POLICY") {
            config.failure_policy = FailurePolicy::from_str(&val)
                .ok_or_else(|| invalid("IMAGER_FAILURE_POLICY", &val))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file. Missing fields keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Pixel-centre corners describe a cell lattice, so they only combine
    /// with the positional rule.
    pub fn validate(&self) -> Result<()> {
        if self.corner_convention == CornerConvention::Centers
            && self.corner_rule == CornerRule::MinMax
        {
            return Err(ReaderError::InvalidConfig(
                "corner_convention 'centers' requires corner_rule 'positional'".to_string(),
            ));
        }
        Ok(())
    }

    /// Options for the area builder.
    pub fn area_options(&self) -> AreaOptions {
        AreaOptions {
            convention: self.corner_convention,
            rule: self.corner_rule,
        }
    }
}

fn invalid(var: &str, value: &str) -> ReaderError {
    ReaderError::InvalidConfig(format!("{}: unrecognised value '{}'", var, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.corner_convention, CornerConvention::Edges);
        assert_eq!(config.corner_rule, CornerRule::Positional);
        assert_eq!(config.failure_policy, FailurePolicy::SkipBand);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_extent_source_resolution() {
        assert_eq!(ExtentSource::Auto.resolve(Instrument::Ghi), ExtentSource::Corners);
        assert_eq!(
            ExtentSource::Auto.resolve(Instrument::Agri),
            ExtentSource::ScanGeometry
        );
        assert_eq!(
            ExtentSource::Corners.resolve(Instrument::Agri),
            ExtentSource::Corners
        );
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(
            ExtentSource::from_str("Scan-Geometry"),
            Some(ExtentSource::ScanGeometry)
        );
        assert_eq!(FailurePolicy::from_str("ABORT"), Some(FailurePolicy::AbortFile));
        assert_eq!(FailurePolicy::from_str("retry"), None);
    }

    #[test]
    fn test_centers_with_min_max_rejected() {
        let config = ReaderConfig {
            corner_convention: CornerConvention::Centers,
            corner_rule: CornerRule::MinMax,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ReaderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ReaderConfig = serde_yaml::from_str("failure_policy: abort_file\n").unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::AbortFile);
        assert_eq!(config.extent_source, ExtentSource::Auto);
    }
}
