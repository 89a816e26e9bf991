//! Geostationary satellite projection.
//!
//! The satellite views Earth from a fixed position above the equator. Projected
//! coordinates are the PROJ `geos` plane: scan angles from nadir multiplied by
//! the satellite height above the surface, in meters.
//!
//! The formulas follow the ellipsoidal `geos` projection of PROJ (and the
//! CGMS LRIT/HRIT navigation formulas it is derived from). All intermediate
//! vectors are expressed in units of the semi-major axis.

use imager_common::{ImagerError, ImagerResult};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::ellipsoid::EllipsoidParameters;

/// Axis swept first by the scan mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepAxis {
    /// FY-4 and GOES-R convention.
    #[default]
    X,
    /// Meteosat and Himawari convention.
    Y,
}

impl SweepAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepAxis::X => "x",
            SweepAxis::Y => "y",
        }
    }
}

/// Bidirectional mapping between lon/lat and the geostationary plane.
///
/// The projector holds nothing but the validated parameters and values
/// derived from them, so identical inputs always give identical outputs.
#[derive(Debug, Clone)]
pub struct FixedGridProjector {
    ellipsoid: EllipsoidParameters,
    sweep: SweepAxis,
    /// Polar radius over equatorial radius
    radius_p: f64,
    radius_p2: f64,
    radius_p_inv2: f64,
    /// Satellite height over equatorial radius
    radius_g_1: f64,
    /// Orbit radius over equatorial radius
    radius_g: f64,
    /// Constant term of the line-of-sight quadratic
    c: f64,
}

impl FixedGridProjector {
    /// Create an x-sweep projector, failing with `InvalidGeometry` on bad parameters.
    pub fn new(ellipsoid: EllipsoidParameters) -> ImagerResult<Self> {
        Self::with_sweep(ellipsoid, SweepAxis::X)
    }

    /// Create a projector with an explicit sweep axis.
    pub fn with_sweep(ellipsoid: EllipsoidParameters, sweep: SweepAxis) -> ImagerResult<Self> {
        ellipsoid.validate()?;

        let radius_p = ellipsoid.semi_minor_axis_m / ellipsoid.semi_major_axis_m;
        let radius_p2 = radius_p * radius_p;
        let radius_g_1 = ellipsoid.satellite_height_m / ellipsoid.semi_major_axis_m;
        let radius_g = 1.0 + radius_g_1;

        Ok(Self {
            ellipsoid,
            sweep,
            radius_p,
            radius_p2,
            radius_p_inv2: 1.0 / radius_p2,
            radius_g_1,
            radius_g,
            c: radius_g * radius_g - 1.0,
        })
    }

    pub fn ellipsoid(&self) -> &EllipsoidParameters {
        &self.ellipsoid
    }

    pub fn sweep(&self) -> SweepAxis {
        self.sweep
    }

    /// Forward transform: geographic degrees to projected meters.
    ///
    /// Returns `OffDisk` for points hidden behind the limb or any input that
    /// does not produce a finite result.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> ImagerResult<(f64, f64)> {
        let (x, y) = self.scan_angles(lon_deg, lat_deg)?;
        Ok((
            x * self.ellipsoid.satellite_height_m,
            y * self.ellipsoid.satellite_height_m,
        ))
    }

    /// Inverse transform: projected meters to geographic degrees.
    ///
    /// Longitudes are wrapped to [-180, 180).
    pub fn unproject(&self, x_m: f64, y_m: f64) -> ImagerResult<(f64, f64)> {
        let h = self.ellipsoid.satellite_height_m;
        self.from_scan_angles(x_m / h, y_m / h)
            .map_err(|_| ImagerError::OffDisk { x: x_m, y: y_m })
    }

    /// Geographic degrees to scan angles (radians).
    pub fn scan_angles(&self, lon_deg: f64, lat_deg: f64) -> ImagerResult<(f64, f64)> {
        let off_disk = ImagerError::OffDisk {
            x: lon_deg,
            y: lat_deg,
        };
        if !lon_deg.is_finite() || !lat_deg.is_finite() || lat_deg.abs() > 90.0 {
            return Err(off_disk);
        }

        let lambda =
            wrap_longitude(lon_deg - self.ellipsoid.sub_satellite_longitude_deg).to_radians();
        // Geocentric latitude
        let phi = (self.radius_p2 * lat_deg.to_radians().tan()).atan();

        // Surface point, Earth-centred, x towards the sub-satellite point
        let r = self.radius_p / (self.radius_p * phi.cos()).hypot(phi.sin());
        let v = Vector3::new(
            r * lambda.cos() * phi.cos(),
            r * lambda.sin() * phi.cos(),
            r * phi.sin(),
        );

        let tmp = self.radius_g - v.x;
        // Negative when the surface normal faces away from the satellite
        if tmp * v.x - v.y * v.y - v.z * v.z * self.radius_p_inv2 < 0.0 {
            return Err(off_disk);
        }

        let (x, y) = match self.sweep {
            SweepAxis::X => ((v.y / v.z.hypot(tmp)).atan(), (v.z / tmp).atan()),
            SweepAxis::Y => ((v.y / tmp).atan(), (v.z / v.y.hypot(tmp)).atan()),
        };

        if !x.is_finite() || !y.is_finite() {
            return Err(off_disk);
        }
        Ok((x, y))
    }

    /// Scan angles (radians) to geographic degrees.
    pub fn from_scan_angles(&self, x_rad: f64, y_rad: f64) -> ImagerResult<(f64, f64)> {
        let off_disk = ImagerError::OffDisk { x: x_rad, y: y_rad };
        if !x_rad.is_finite() || !y_rad.is_finite() {
            return Err(off_disk);
        }

        // Line of sight from the satellite, x pointing back towards Earth
        let (vy, vz) = match self.sweep {
            SweepAxis::X => {
                let vz = y_rad.tan();
                (x_rad.tan() * 1.0f64.hypot(vz), vz)
            }
            SweepAxis::Y => {
                let vy = x_rad.tan();
                (vy, y_rad.tan() * 1.0f64.hypot(vy))
            }
        };
        let sight = Vector3::new(-1.0, vy, vz);

        let scaled_z = sight.z / self.radius_p;
        let a = sight.x * sight.x + sight.y * sight.y + scaled_z * scaled_z;
        let b = 2.0 * self.radius_g * sight.x;
        let det = b * b - 4.0 * a * self.c;
        if det < 0.0 {
            return Err(off_disk);
        }

        // Nearest intersection with the ellipsoid
        let k = (-b - det.sqrt()) / (2.0 * a);
        let p = Vector3::new(self.radius_g, 0.0, 0.0) + sight * k;

        let lambda = p.y.atan2(p.x);
        let phi = (p.z * lambda.cos() / p.x).atan();
        let phi = (self.radius_p_inv2 * phi.tan()).atan();

        let lon = wrap_longitude(lambda.to_degrees() + self.ellipsoid.sub_satellite_longitude_deg);
        let lat = phi.to_degrees();
        if !lon.is_finite() || !lat.is_finite() {
            return Err(off_disk);
        }
        Ok((lon, lat))
    }

    /// Largest scan angle (radians) that still intersects the equator.
    pub fn max_scan_angle(&self) -> f64 {
        (1.0 / self.radius_g).asin()
    }
}

/// Wrap a longitude in degrees to [-180, 180).
pub fn wrap_longitude(lon_deg: f64) -> f64 {
    (lon_deg + 180.0).rem_euclid(360.0) - 180.0
}
