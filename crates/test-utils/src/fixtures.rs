//! Reference FY-4 scenes for tests.
//!
//! Plain data only, so every crate in the workspace can use these without
//! pulling in the reader. Projected values come from an independent
//! evaluation of the PROJ `geos` formulas.

/// Satellite and ellipsoid parameters.
pub mod geometry {
    /// Semi-major axis as written in FY-4 L1 files (meters)
    pub const SEMI_MAJOR_AXIS_M: f64 = 6378137.0;

    /// Semi-minor axis as written in FY-4 L1 files (meters)
    pub const SEMI_MINOR_AXIS_M: f64 = 6356752.3;

    /// `1 / (a/b - 1)` of the file axes
    pub const INVERSE_FLATTENING: f64 = 297.2570248822634;

    /// Polar radius implied by `a` and `INVERSE_FLATTENING` (meters)
    pub const DESCRIPTOR_SEMI_MINOR_AXIS_M: f64 = 6356680.359900321;

    /// Nominal satellite height above the surface (meters)
    pub const SATELLITE_HEIGHT_M: f64 = 35786000.0;

    /// FY-4B operational sub-satellite longitude
    pub const FY4B_LONGITUDE: f64 = 104.7;

    /// FY-4A operational sub-satellite longitude
    pub const FY4A_LONGITUDE: f64 = 104.7;

    /// `x` of the equator point 10 degrees east of nadir (meters)
    pub const EQUATOR_PLUS_10_X: f64 = 1104210.4632876362;
}

/// Corner sets as `(lon, lat)` in FY-4 attribute order.
pub mod corners {
    /// A symmetric +-60 degree box centred on 104.7E.
    ///
    /// Index 2 is north-west and index 3 is south-east.
    pub const SYMMETRIC_60: [(f64, f64); 4] =
        [(164.7, 60.0), (44.7, -60.0), (44.7, 60.0), (164.7, -60.0)];

    /// Same corners with north-west and south-east swapped.
    pub const SWAPPED_60: [(f64, f64); 4] =
        [(164.7, 60.0), (44.7, -60.0), (164.7, -60.0), (44.7, 60.0)];

    /// Absolute projected corner coordinate for the symmetric box on the
    /// file axes `a` and `b` (meters).
    pub const SYMMETRIC_60_X: f64 = 2416716.8967435960;
    pub const SYMMETRIC_60_Y: f64 = 4822976.168223309;

    /// Same corner on the ellipsoid given by `a` and `rf` (meters).
    pub const AREA_60_X: f64 = 2416738.718862842;
    pub const AREA_60_Y: f64 = 4822910.286640058;

    /// Area extent `(x_min, y_min, x_max, y_max)` of the symmetric box.
    pub const SYMMETRIC_60_EXTENT: (f64, f64, f64, f64) =
        (-AREA_60_X, -AREA_60_Y, AREA_60_X, AREA_60_Y);

    /// Pixel size of the symmetric box on a 5496 x 5496 grid.
    pub const SYMMETRIC_60_PIXEL_5496: (f64, f64) = (879.4536822644985, 1755.061967481826);
}

/// Full-disk scan-geometry reference values.
pub mod full_disk {
    /// Lines and columns of the 2 km full disk
    pub const SIZE_2KM: usize = 5496;

    /// Half width of the 2 km full-disk extent (meters)
    pub const HALF_EXTENT_2KM: f64 = 5496021.21027401;

    /// Nadir pixel size from CFAC at 2 km (meters)
    pub const PIXEL_2KM: f64 = 2000.007718440324;

    /// Nadir pixel size from CFAC at 4 km (meters)
    pub const PIXEL_4KM: f64 = 4000.0154368806475;
}

/// A small GHI 2 km regional scene.
pub mod ghi_regx {
    pub const FILE_NAME: &str =
        "FY4B-_GHI---_N_REGX_1330E_L1-_FDI-_MULT_NOM_20220622002000_20220622002459_2000M_V0001.HDF";

    pub const PLATFORM: &str = "FY4B";
    pub const PLATFORM_NAME: &str = "FY-4B";
    pub const OBSERVATION_TYPE: &str = "REGX";

    pub const N_LINES: usize = 6;
    pub const N_COLUMNS: usize = 8;

    pub const CORNER_LONGITUDES: [f64; 4] = [164.7, 44.7, 44.7, 164.7];
    pub const CORNER_LATITUDES: [f64; 4] = [60.0, -60.0, 60.0, -60.0];

    pub const SUB_SATELLITE_LATITUDE: f64 = 0.0;
    pub const SUB_SATELLITE_LONGITUDE: f64 = 104.7;
    /// `NOMSatHeight` in meters
    pub const SATELLITE_HEIGHT_M: f64 = 35786000.0;

    /// Semi-axes in kilometres as stored in the file
    pub const SEMI_MAJOR_AXIS_KM: f64 = 6378.137;
    pub const SEMI_MINOR_AXIS_KM: f64 = 6356.7523;

    /// Fill value for raw counts
    pub const FILL_VALUE: u16 = 65535;

    /// Reflective channel slope and intercept
    pub const REFLECTANCE_SLOPE: f64 = 0.01;
    pub const REFLECTANCE_INTERCEPT: f64 = -20.0;
}
