//! Earth ellipsoid and satellite orbit parameters.

use imager_common::{ImagerError, ImagerResult};
use serde::{Deserialize, Serialize};

/// Ellipsoid axes plus the nominal satellite position.
///
/// Heights are above the ellipsoid surface, as in the FY-4 `NOMSatHeight`
/// attribute and the PROJ `+h` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipsoidParameters {
    /// Equatorial radius (meters)
    pub semi_major_axis_m: f64,
    /// Polar radius (meters)
    pub semi_minor_axis_m: f64,
    /// Satellite height above the surface (meters)
    pub satellite_height_m: f64,
    /// Longitude of the sub-satellite point (degrees east)
    pub sub_satellite_longitude_deg: f64,
}

impl EllipsoidParameters {
    /// Create parameters without validating them.
    pub fn new(
        semi_major_axis_m: f64,
        semi_minor_axis_m: f64,
        satellite_height_m: f64,
        sub_satellite_longitude_deg: f64,
    ) -> Self {
        Self {
            semi_major_axis_m,
            semi_minor_axis_m,
            satellite_height_m,
            sub_satellite_longitude_deg,
        }
    }

    /// Nominal FY-4 geometry: WGS84 axes as written in the L1 files
    /// (6378.137 km / 6356.7523 km) and a 35786 km orbit.
    pub fn fy4(sub_satellite_longitude_deg: f64) -> Self {
        Self::new(6378137.0, 6356752.3, 35786000.0, sub_satellite_longitude_deg)
    }

    /// Build from the kilometre-valued attributes found in FY-4 files.
    pub fn from_km(
        semi_major_axis_km: f64,
        semi_minor_axis_km: f64,
        satellite_height_km: f64,
        sub_satellite_longitude_deg: f64,
    ) -> Self {
        Self::new(
            semi_major_axis_km * 1e3,
            semi_minor_axis_km * 1e3,
            satellite_height_km * 1e3,
            sub_satellite_longitude_deg,
        )
    }

    /// Check `a > b > 0`, `h > 0` and that every value is finite.
    pub fn validate(&self) -> ImagerResult<()> {
        let values = [
            self.semi_major_axis_m,
            self.semi_minor_axis_m,
            self.satellite_height_m,
            self.sub_satellite_longitude_deg,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ImagerError::InvalidGeometry(format!(
                "non-finite ellipsoid parameter in {:?}",
                self
            )));
        }
        if self.semi_minor_axis_m <= 0.0 {
            return Err(ImagerError::InvalidGeometry(format!(
                "semi-minor axis must be positive, got {}",
                self.semi_minor_axis_m
            )));
        }
        if self.semi_major_axis_m <= self.semi_minor_axis_m {
            return Err(ImagerError::InvalidGeometry(format!(
                "semi-major axis {} must exceed semi-minor axis {}",
                self.semi_major_axis_m, self.semi_minor_axis_m
            )));
        }
        if self.satellite_height_m <= 0.0 {
            return Err(ImagerError::InvalidGeometry(format!(
                "satellite height must be positive, got {}",
                self.satellite_height_m
            )));
        }
        Ok(())
    }

    /// The `rf` value carried in FY-4 projection descriptors: `1 / (a/b - 1)`.
    ///
    /// This equals `b / (a - b)`, one less than the geodetic inverse
    /// flattening `a / (a - b)`. Descriptors carry only `a` and `rf`, so
    /// area definitions are computed on the ellipsoid they imply.
    pub fn inverse_flattening(&self) -> f64 {
        1.0 / (self.semi_major_axis_m / self.semi_minor_axis_m - 1.0)
    }

    /// Polar radius implied by `a` and [`inverse_flattening`](Self::inverse_flattening):
    /// `a * (1 - 1/rf)`.
    pub fn descriptor_semi_minor_axis_m(&self) -> f64 {
        self.semi_major_axis_m * (1.0 - 1.0 / self.inverse_flattening())
    }

    /// The ellipsoid an `a` + `rf` projection descriptor describes.
    ///
    /// For WGS84-like axes the polar radius shrinks by about 72 m.
    pub fn descriptor_ellipsoid(&self) -> Self {
        Self {
            semi_minor_axis_m: self.descriptor_semi_minor_axis_m(),
            ..*self
        }
    }
}
