//! Where each quantity lives inside AGRI and GHI files.
//!
//! GHI files group variables under `Data/`, `Calibration/` and
//! `Navigation/`; AGRI files keep them at the root.

use projection::Instrument;

pub const CORNER_LATITUDES: &str = "/attr/Corner-Point Latitudes";
pub const CORNER_LONGITUDES: &str = "/attr/Corner-Point Longitudes";
pub const SEMI_MAJOR_AXIS: &str = "/attr/Semi_major_axis";
pub const SEMI_MINOR_AXIS: &str = "/attr/Semi_minor_axis";
pub const SUB_SATELLITE_LATITUDE: &str = "/attr/NOMSubSatLat";
pub const SUB_SATELLITE_LONGITUDE: &str = "/attr/NOMSubSatLon";
pub const SATELLITE_HEIGHT: &str = "/attr/NOMSatHeight";
pub const REGION_LENGTH: &str = "/attr/RegLength";
pub const REGION_WIDTH: &str = "/attr/RegWidth";
pub const BEGIN_LINE: &str = "/attr/Begin Line Number";
pub const END_LINE: &str = "/attr/End Line Number";
pub const BEGIN_PIXEL: &str = "/attr/Begin Pixel Number";
pub const END_PIXEL: &str = "/attr/End Pixel Number";
pub const SATELLITE_NAME: &str = "/attr/Satellite Name";
pub const SENSOR_CODE: &str = "/attr/Sensor Identification Code";

const COEFFICIENTS: &str = "CALIBRATION_COEF(SCALE+OFFSET)";

/// Variable key layout of one instrument's files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLayout {
    grouped: bool,
}

impl KeyLayout {
    pub fn for_instrument(instrument: Instrument) -> Self {
        Self {
            grouped: instrument == Instrument::Ghi,
        }
    }

    fn prefixed(&self, group: &str, name: String) -> String {
        if self.grouped {
            format!("{}/{}", group, name)
        } else {
            name
        }
    }

    /// Raw counts of a channel, e.g. `Data/NOMChannel07`.
    pub fn counts_key(&self, channel: u8) -> String {
        self.prefixed("Data", format!("NOMChannel{:02}", channel))
    }

    /// Per-channel `[slope, intercept]` matrix.
    pub fn coefficients_key(&self) -> String {
        self.prefixed("Calibration", COEFFICIENTS.to_string())
    }

    /// Count-indexed brightness temperature table of a channel.
    pub fn lut_key(&self, channel: u8) -> String {
        self.prefixed("Calibration", format!("CALChannel{:02}", channel))
    }

    /// Angle and geolocation variables such as `NOMSunZenith`.
    pub fn navigation_key(&self, name: &str) -> String {
        self.prefixed("Navigation", name.to_string())
    }
}
