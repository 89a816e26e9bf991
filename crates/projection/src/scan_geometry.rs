//! Per-instrument fixed-grid scan geometry.
//!
//! FY-4 imagers encode scan angles with the CGMS fixed-point convention:
//!
//! ```text
//! angle_deg = (pixel - offset) * 2^16 / scale_factor
//! ```
//!
//! where `offset` is COFF/LOFF and `scale_factor` is CFAC/LFAC. The tables
//! below hold those coefficients for each nominal resolution.

use std::fmt;
use std::str::FromStr;

use imager_common::{ImagerError, ImagerResult, ResolutionTag};
use serde::{Deserialize, Serialize};

/// 2^16, the fixed-point scale of CFAC/LFAC.
pub const SCAN_ANGLE_SCALE: f64 = 65536.0;

/// Resolutions covered by the FY-4 coefficient tables, finest first.
pub const FY4_RESOLUTIONS: [ResolutionTag; 5] = ResolutionTag::ALL;

const FY4_COFF: [f64; 5] = [21983.5, 10991.5, 5495.5, 2747.5, 1373.5];
const FY4_LOFF: [f64; 5] = [21983.5, 10991.5, 5495.5, 2747.5, 1373.5];
const FY4_CFAC: [f64; 5] = [
    163730199.0,
    81865099.0,
    40932549.0,
    20466274.0,
    10233137.0,
];
const FY4_LFAC: [f64; 5] = [
    163730199.0,
    81865099.0,
    40932549.0,
    20466274.0,
    10233137.0,
];

/// Scale/offset coefficients for one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanGeometryCoefficients {
    pub resolution: ResolutionTag,
    /// COFF (pixels)
    pub column_offset: f64,
    /// LOFF (pixels)
    pub line_offset: f64,
    /// CFAC
    pub column_scale_factor: f64,
    /// LFAC
    pub line_scale_factor: f64,
}

impl ScanGeometryCoefficients {
    /// Create coefficients, rejecting zero or non-finite scale factors.
    pub fn new(
        resolution: ResolutionTag,
        column_offset: f64,
        line_offset: f64,
        column_scale_factor: f64,
        line_scale_factor: f64,
    ) -> ImagerResult<Self> {
        for (name, value) in [
            ("column_scale_factor", column_scale_factor),
            ("line_scale_factor", line_scale_factor),
        ] {
            if value == 0.0 || !value.is_finite() {
                return Err(ImagerError::InvalidGeometry(format!(
                    "{} must be finite and nonzero, got {}",
                    name, value
                )));
            }
        }
        if !column_offset.is_finite() || !line_offset.is_finite() {
            return Err(ImagerError::InvalidGeometry(
                "scan offsets must be finite".to_string(),
            ));
        }
        Ok(Self {
            resolution,
            column_offset,
            line_offset,
            column_scale_factor,
            line_scale_factor,
        })
    }

    /// Column scan angle step per pixel (degrees).
    pub fn column_step_deg(&self) -> f64 {
        SCAN_ANGLE_SCALE / self.column_scale_factor
    }

    /// Line scan angle step per pixel (degrees).
    pub fn line_step_deg(&self) -> f64 {
        SCAN_ANGLE_SCALE / self.line_scale_factor
    }

    /// East-west scan angle (degrees) of a fractional column position.
    pub fn column_to_angle(&self, column: f64) -> f64 {
        (column - self.column_offset) * self.column_step_deg()
    }

    /// North-south scan angle magnitude (degrees) of a fractional line
    /// position, positive for lines past the offset.
    pub fn line_to_angle(&self, line: f64) -> f64 {
        (line - self.line_offset) * self.line_step_deg()
    }

    /// Fractional column for a scan angle in degrees.
    pub fn angle_to_column(&self, angle_deg: f64) -> f64 {
        angle_deg / self.column_step_deg() + self.column_offset
    }

    /// Fractional line for a scan angle in degrees.
    pub fn angle_to_line(&self, angle_deg: f64) -> f64 {
        angle_deg / self.line_step_deg() + self.line_offset
    }

    /// Nominal pixel size at nadir (meters) for a satellite height.
    pub fn nadir_pixel_size(&self, satellite_height_m: f64) -> (f64, f64) {
        (
            self.column_step_deg().to_radians() * satellite_height_m,
            self.line_step_deg().to_radians() * satellite_height_m,
        )
    }
}

/// Capability interface implemented by each instrument's coefficient provider.
pub trait ScanGeometryTable: Send + Sync {
    /// Instrument name, e.g. "GHI".
    fn instrument(&self) -> &'static str;

    /// Supported resolutions, finest first.
    fn resolutions(&self) -> &'static [ResolutionTag];

    /// Static band-name-to-resolution policy.
    fn classify_band(&self, band_name: &str) -> Option<ResolutionTag>;

    /// Raw coefficients for a resolution the instrument supports.
    fn fixed_grid_coefficients(&self, resolution: ResolutionTag) -> ScanGeometryCoefficients;

    /// Look up coefficients, failing with `UnsupportedResolution`.
    fn lookup(&self, resolution: ResolutionTag) -> ImagerResult<ScanGeometryCoefficients> {
        if !self.resolutions().contains(&resolution) {
            return Err(ImagerError::UnsupportedResolution {
                instrument: self.instrument().to_string(),
                resolution: resolution.to_string(),
            });
        }
        Ok(self.fixed_grid_coefficients(resolution))
    }
}

/// Coefficients from the shared FY-4 table.
fn fy4_coefficients(resolution: ResolutionTag) -> ScanGeometryCoefficients {
    let idx = FY4_RESOLUTIONS
        .iter()
        .position(|r| *r == resolution)
        .unwrap_or(FY4_RESOLUTIONS.len() - 1);
    ScanGeometryCoefficients {
        resolution,
        column_offset: FY4_COFF[idx],
        line_offset: FY4_LOFF[idx],
        column_scale_factor: FY4_CFAC[idx],
        line_scale_factor: FY4_LFAC[idx],
    }
}

/// Channel number from names like "C07", "c7" or "Channel07".
pub fn channel_number(band_name: &str) -> Option<u8> {
    let lower = band_name.trim().to_lowercase();
    let digits = lower
        .strip_prefix("channel")
        .or_else(|| lower.strip_prefix('c'))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| *n > 0)
}

/// Advanced Geosynchronous Radiation Imager (FY-4A/FY-4B).
#[derive(Debug, Clone, Copy, Default)]
pub struct AgriScanGeometry;

impl AgriScanGeometry {
    const RESOLUTIONS: [ResolutionTag; 4] = [
        ResolutionTag::R500m,
        ResolutionTag::R1000m,
        ResolutionTag::R2000m,
        ResolutionTag::R4000m,
    ];
    const CHANNELS: u8 = 15;
}

impl ScanGeometryTable for AgriScanGeometry {
    fn instrument(&self) -> &'static str {
        "AGRI"
    }

    fn resolutions(&self) -> &'static [ResolutionTag] {
        &Self::RESOLUTIONS
    }

    fn classify_band(&self, band_name: &str) -> Option<ResolutionTag> {
        let channel = channel_number(band_name).filter(|c| *c <= Self::CHANNELS)?;
        Some(match channel {
            2 => ResolutionTag::R500m,
            1 | 3 => ResolutionTag::R1000m,
            4..=7 => ResolutionTag::R2000m,
            _ => ResolutionTag::R4000m,
        })
    }

    fn fixed_grid_coefficients(&self, resolution: ResolutionTag) -> ScanGeometryCoefficients {
        fy4_coefficients(resolution)
    }
}

/// Geostationary High-speed Imager (FY-4B).
#[derive(Debug, Clone, Copy, Default)]
pub struct GhiScanGeometry;

impl GhiScanGeometry {
    const RESOLUTIONS: [ResolutionTag; 3] = [
        ResolutionTag::R250m,
        ResolutionTag::R500m,
        ResolutionTag::R2000m,
    ];
    const CHANNELS: u8 = 7;
}

impl ScanGeometryTable for GhiScanGeometry {
    fn instrument(&self) -> &'static str {
        "GHI"
    }

    fn resolutions(&self) -> &'static [ResolutionTag] {
        &Self::RESOLUTIONS
    }

    fn classify_band(&self, band_name: &str) -> Option<ResolutionTag> {
        let channel = channel_number(band_name).filter(|c| *c <= Self::CHANNELS)?;
        Some(match channel {
            1 => ResolutionTag::R250m,
            2..=6 => ResolutionTag::R500m,
            _ => ResolutionTag::R2000m,
        })
    }

    fn fixed_grid_coefficients(&self, resolution: ResolutionTag) -> ScanGeometryCoefficients {
        fy4_coefficients(resolution)
    }
}

/// Imagers this crate knows how to navigate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Instrument {
    Agri,
    Ghi,
}

static AGRI: AgriScanGeometry = AgriScanGeometry;
static GHI: GhiScanGeometry = GhiScanGeometry;

impl Instrument {
    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Agri => "AGRI",
            Instrument::Ghi => "GHI",
        }
    }

    /// The coefficient provider for this instrument.
    pub fn scan_geometry(&self) -> &'static dyn ScanGeometryTable {
        match self {
            Instrument::Agri => &AGRI,
            Instrument::Ghi => &GHI,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Instrument {
    type Err = ImagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('-').to_uppercase().as_str() {
            "AGRI" => Ok(Instrument::Agri),
            "GHI" => Ok(Instrument::Ghi),
            _ => Err(ImagerError::malformed(
                "instrument",
                format!("unknown instrument '{}'", s),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_supported() {
        let coeffs = GhiScanGeometry.lookup(ResolutionTag::R2000m).unwrap();
        assert_eq!(coeffs.column_offset, 2747.5);
        assert_eq!(coeffs.line_scale_factor, 20466274.0);
        assert_eq!(coeffs.resolution, ResolutionTag::R2000m);
    }

    #[test]
    fn test_lookup_unsupported() {
        let err = GhiScanGeometry.lookup(ResolutionTag::R4000m).unwrap_err();
        assert!(matches!(err, ImagerError::UnsupportedResolution { .. }));

        let err = AgriScanGeometry.lookup(ResolutionTag::R250m).unwrap_err();
        assert!(matches!(err, ImagerError::UnsupportedResolution { .. }));
    }

    #[test]
    fn test_resolutions_are_ordered() {
        for table in [Instrument::Agri.scan_geometry(), Instrument::Ghi.scan_geometry()] {
            let res = table.resolutions();
            assert!(res.windows(2).all(|w| w[0] < w[1]), "{:?}", res);
        }
    }

    #[test]
    fn test_ghi_band_policy() {
        assert_eq!(GhiScanGeometry.classify_band("C01"), Some(ResolutionTag::R250m));
        assert_eq!(GhiScanGeometry.classify_band("C04"), Some(ResolutionTag::R500m));
        assert_eq!(GhiScanGeometry.classify_band("C07"), Some(ResolutionTag::R2000m));
        assert_eq!(GhiScanGeometry.classify_band("C08"), None);
        assert_eq!(GhiScanGeometry.classify_band("satellite_zenith"), None);
    }

    #[test]
    fn test_agri_band_policy() {
        assert_eq!(AgriScanGeometry.classify_band("C02"), Some(ResolutionTag::R500m));
        assert_eq!(AgriScanGeometry.classify_band("C03"), Some(ResolutionTag::R1000m));
        assert_eq!(AgriScanGeometry.classify_band("C06"), Some(ResolutionTag::R2000m));
        assert_eq!(AgriScanGeometry.classify_band("C12"), Some(ResolutionTag::R4000m));
        assert_eq!(AgriScanGeometry.classify_band("C16"), None);
    }

    #[test]
    fn test_classified_resolutions_are_supported() {
        for instrument in [Instrument::Agri, Instrument::Ghi] {
            let table = instrument.scan_geometry();
            for channel in 1..=15 {
                let name = format!("C{:02}", channel);
                if let Some(res) = table.classify_band(&name) {
                    assert!(table.lookup(res).is_ok(), "{} {}", instrument, name);
                }
            }
        }
    }

    #[test]
    fn test_channel_number() {
        assert_eq!(channel_number("C07"), Some(7));
        assert_eq!(channel_number("Channel12"), Some(12));
        assert_eq!(channel_number("c3"), Some(3));
        assert_eq!(channel_number("C"), None);
        assert_eq!(channel_number("C00"), None);
        assert_eq!(channel_number("CAL"), None);
    }

    #[test]
    fn test_fixed_point_angles() {
        let coeffs = GhiScanGeometry.lookup(ResolutionTag::R2000m).unwrap();
        assert_eq!(coeffs.column_to_angle(2747.5), 0.0);
        let angle = coeffs.column_to_angle(0.0);
        assert!((coeffs.angle_to_column(angle) - 0.0).abs() < 1e-9);
        // 2^16 / 20466274 degrees per pixel
        assert!((coeffs.column_step_deg() - 0.0032021461).abs() < 1e-9);
    }

    #[test]
    fn test_zero_scale_rejected() {
        let err = ScanGeometryCoefficients::new(ResolutionTag::R500m, 0.0, 0.0, 0.0, 1.0);
        assert!(matches!(err, Err(ImagerError::InvalidGeometry(_))));
    }

    #[test]
    fn test_instrument_from_str() {
        assert_eq!("ghi".parse::<Instrument>().unwrap(), Instrument::Ghi);
        assert_eq!("AGRI".parse::<Instrument>().unwrap(), Instrument::Agri);
        assert_eq!("GHI-".parse::<Instrument>().unwrap(), Instrument::Ghi);
        assert!("ABI".parse::<Instrument>().is_err());
    }
}
