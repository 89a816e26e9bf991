//! Area definitions for geostationary fixed-grid images.
//!
//! An area definition ties an image grid to the `geos` projection plane:
//! a projection descriptor, the grid shape, and the rectangular extent of
//! the outer pixel edges in projected meters. Downstream resampling only
//! needs this description to geolocate every pixel.
//!
//! Two builders are provided:
//! - from the four observed corner coordinates stored in the file
//!   ([`AreaDefinitionBuilder::build`]), which is what GHI files use;
//! - from the fixed-point scan-geometry coefficients and a window into the
//!   full disk ([`AreaDefinitionBuilder::build_from_scan_geometry`]).

use std::collections::BTreeMap;

use imager_common::{ImagerError, ImagerResult, ResolutionTag};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::ellipsoid::EllipsoidParameters;
use crate::geostationary::{FixedGridProjector, SweepAxis};
use crate::scan_geometry::{ScanGeometryCoefficients, ScanGeometryTable};

/// Index of the north-west corner in FY-4 corner attributes.
pub const NORTH_WEST: usize = 2;
/// Index of the south-east corner in FY-4 corner attributes.
pub const SOUTH_EAST: usize = 3;

/// The four observed image corners as `(lon, lat)` degrees.
///
/// Order is the instrument's attribute order and is never rearranged:
/// FY-4 files put the north-west corner at index 2 and the south-east
/// corner at index 3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerSet([(f64, f64); 4]);

impl CornerSet {
    pub fn new(points: [(f64, f64); 4]) -> Self {
        Self(points)
    }

    /// Pair up the `Corner-Point Longitudes`/`Latitudes` attributes.
    pub fn from_lon_lat(lons: &[f64], lats: &[f64]) -> ImagerResult<Self> {
        if lons.len() != 4 || lats.len() != 4 {
            return Err(ImagerError::malformed(
                "corner points",
                format!(
                    "expected 4 longitudes and 4 latitudes, got {} and {}",
                    lons.len(),
                    lats.len()
                ),
            ));
        }
        Ok(Self([
            (lons[0], lats[0]),
            (lons[1], lats[1]),
            (lons[2], lats[2]),
            (lons[3], lats[3]),
        ]))
    }

    pub fn points(&self) -> &[(f64, f64); 4] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<(f64, f64)> {
        self.0.get(index).copied()
    }
}

/// Image shape in lines and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDims {
    pub n_lines: usize,
    pub n_columns: usize,
}

impl ImageDims {
    pub fn new(n_lines: usize, n_columns: usize) -> Self {
        Self { n_lines, n_columns }
    }

    fn validate(&self) -> ImagerResult<()> {
        if self.n_lines == 0 || self.n_columns == 0 {
            return Err(ImagerError::InvalidGeometry(format!(
                "image must have at least one line and column, got {}x{}",
                self.n_lines, self.n_columns
            )));
        }
        Ok(())
    }
}

/// Rectangular extent of the outer pixel edges in projected meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaExtent {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl AreaExtent {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// `(x_min, y_min, x_max, y_max)`
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x_min, self.y_min, self.x_max, self.y_max)
    }

    /// Fail with `DegenerateExtent` unless both spans are finite and positive.
    fn check_orientation(self) -> ImagerResult<Self> {
        let finite = [self.x_min, self.y_min, self.x_max, self.y_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.x_max <= self.x_min || self.y_max <= self.y_min {
            return Err(ImagerError::DegenerateExtent {
                x_min: self.x_min,
                y_min: self.y_min,
                x_max: self.x_max,
                y_max: self.y_max,
            });
        }
        Ok(self)
    }
}

/// PROJ-compatible description of the `geos` projection.
///
/// The shape is given by `a` and `rf` alone. `b` is the polar radius those
/// two imply, which is the one extents are computed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionDescriptor {
    /// Equatorial radius (meters)
    pub a: f64,
    /// Polar radius implied by `a` and `rf` (meters)
    pub b: f64,
    /// `1 / (a/b - 1)` of the file's axes, as FY-4 readers have always
    /// reported it
    pub rf: f64,
    /// Sub-satellite longitude (degrees)
    pub lon_0: f64,
    /// Satellite height above the surface (meters)
    pub h: f64,
    pub proj: String,
    pub units: String,
    pub sweep: SweepAxis,
}

impl ProjectionDescriptor {
    pub fn new(ellipsoid: &EllipsoidParameters, sweep: SweepAxis) -> Self {
        Self {
            a: ellipsoid.semi_major_axis_m,
            b: ellipsoid.descriptor_semi_minor_axis_m(),
            rf: ellipsoid.inverse_flattening(),
            lon_0: ellipsoid.sub_satellite_longitude_deg,
            h: ellipsoid.satellite_height_m,
            proj: "geos".to_string(),
            units: "m".to_string(),
            sweep,
        }
    }

    /// PROJ string with the shape as `+a` and `+rf`.
    pub fn to_proj_string(&self) -> String {
        format!(
            "+proj={} +lon_0={} +h={} +a={} +rf={} +units={} +sweep={} +no_defs +type=crs",
            self.proj,
            self.lon_0,
            self.h,
            self.a,
            self.rf,
            self.units,
            self.sweep.as_str()
        )
    }

    /// Key/value form: `a`, `rf`, `lon_0`, `h`, `proj`, `units`, `sweep`.
    pub fn to_proj_dict(&self) -> BTreeMap<String, Value> {
        let mut dict = BTreeMap::new();
        dict.insert("a".to_string(), Value::from(self.a));
        dict.insert("rf".to_string(), Value::from(self.rf));
        dict.insert("lon_0".to_string(), Value::from(self.lon_0));
        dict.insert("h".to_string(), Value::from(self.h));
        dict.insert("proj".to_string(), Value::from(self.proj.clone()));
        dict.insert("units".to_string(), Value::from(self.units.clone()));
        dict.insert("sweep".to_string(), Value::from(self.sweep.as_str()));
        dict
    }
}

/// Names stamped onto an area definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaNaming {
    /// Platform, e.g. "FY-4B"
    pub platform: String,
    /// Instrument, e.g. "GHI"
    pub instrument: String,
    /// Observation type from the file name, e.g. "REGX" or "DISK"
    pub observation_type: String,
}

impl AreaNaming {
    pub fn new(
        platform: impl Into<String>,
        instrument: impl Into<String>,
        observation_type: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            instrument: instrument.into(),
            observation_type: observation_type.into(),
        }
    }

    fn area_id(&self, resolution: ResolutionTag) -> String {
        format!("{}_{}", self.observation_type, resolution)
    }

    fn description(&self) -> String {
        format!("{} {} area", self.instrument, self.observation_type)
    }

    fn proj_id(&self, resolution: ResolutionTag) -> String {
        format!("{}, {}", self.platform, resolution)
    }
}

/// An immutable, derived description of an image's georeferencing.
///
/// Only the builders in this module can create one, so the extent always
/// comes from projected coordinates and is always positively oriented.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaDefinition {
    area_id: String,
    description: String,
    proj_id: String,
    resolution: ResolutionTag,
    projection: ProjectionDescriptor,
    n_lines: usize,
    n_columns: usize,
    pixel_size_x: f64,
    pixel_size_y: f64,
    extent: AreaExtent,
}

impl AreaDefinition {
    fn new(
        naming: &AreaNaming,
        resolution: ResolutionTag,
        projection: ProjectionDescriptor,
        dims: ImageDims,
        extent: AreaExtent,
    ) -> ImagerResult<Self> {
        let extent = extent.check_orientation()?;
        Ok(Self {
            area_id: naming.area_id(resolution),
            description: naming.description(),
            proj_id: naming.proj_id(resolution),
            resolution,
            projection,
            n_lines: dims.n_lines,
            n_columns: dims.n_columns,
            pixel_size_x: extent.width() / dims.n_columns as f64,
            pixel_size_y: extent.height() / dims.n_lines as f64,
            extent,
        })
    }

    pub fn area_id(&self) -> &str {
        &self.area_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn proj_id(&self) -> &str {
        &self.proj_id
    }

    pub fn resolution(&self) -> ResolutionTag {
        self.resolution
    }

    pub fn projection(&self) -> &ProjectionDescriptor {
        &self.projection
    }

    pub fn n_lines(&self) -> usize {
        self.n_lines
    }

    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    pub fn pixel_size_x(&self) -> f64 {
        self.pixel_size_x
    }

    pub fn pixel_size_y(&self) -> f64 {
        self.pixel_size_y
    }

    pub fn extent(&self) -> &AreaExtent {
        &self.extent
    }

    /// Projected coordinates of a pixel centre (line 0 is the top row).
    pub fn pixel_center(&self, line: usize, column: usize) -> Option<(f64, f64)> {
        if line >= self.n_lines || column >= self.n_columns {
            return None;
        }
        let x = self.extent.x_min + (column as f64 + 0.5) * self.pixel_size_x;
        let y = self.extent.y_max - (line as f64 + 0.5) * self.pixel_size_y;
        Some((x, y))
    }
}

/// What the corner coordinates in the file refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerConvention {
    /// Corners are the outer pixel edges; the extent is the projected corners.
    #[default]
    Edges,
    /// Corners are the centres of the outermost pixels; the projected corners
    /// span one cell fewer than the image and the extent grows by half a
    /// pixel on every side.
    Centers,
}

/// How the extent is picked from the four projected corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerRule {
    /// x from the north-west/south-east corners by index, no sorting.
    /// A wrong corner order shows up as a reversed extent.
    #[default]
    Positional,
    /// Coordinate-wise min/max over all four corners. Never reversed, but
    /// widens the extent when the corners do not form a rectangle.
    MinMax,
}

/// Scan order of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanDirection {
    #[default]
    NorthToSouth,
    SouthToNorth,
}

/// Position of an image inside the instrument's full-disk grid.
///
/// Lines and columns are 0-based full-disk pixel indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedGridWindow {
    pub first_line: usize,
    pub first_column: usize,
    pub dims: ImageDims,
}

impl FixedGridWindow {
    /// The whole disk for a resolution: `2 * offset + 1` pixels per side.
    pub fn full_disk(coeffs: &ScanGeometryCoefficients) -> Self {
        let n_columns = (2.0 * coeffs.column_offset + 1.0).round() as usize;
        let n_lines = (2.0 * coeffs.line_offset + 1.0).round() as usize;
        Self {
            first_line: 0,
            first_column: 0,
            dims: ImageDims::new(n_lines, n_columns),
        }
    }
}

/// Knobs for how corners are turned into an extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AreaOptions {
    pub convention: CornerConvention,
    pub rule: CornerRule,
}

/// Builds area definitions for one instrument and satellite position.
pub struct AreaDefinitionBuilder<'a> {
    scan_geometry: &'a dyn ScanGeometryTable,
    ellipsoid: EllipsoidParameters,
    naming: AreaNaming,
    options: AreaOptions,
}

impl<'a> AreaDefinitionBuilder<'a> {
    pub fn new(
        scan_geometry: &'a dyn ScanGeometryTable,
        ellipsoid: EllipsoidParameters,
        naming: AreaNaming,
    ) -> Self {
        Self {
            scan_geometry,
            ellipsoid,
            naming,
            options: AreaOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AreaOptions) -> Self {
        self.options = options;
        self
    }

    /// Area definition from the four observed corners.
    pub fn build(
        &self,
        resolution: ResolutionTag,
        corners: &CornerSet,
        dims: ImageDims,
    ) -> ImagerResult<AreaDefinition> {
        dims.validate()?;
        let coeffs = self.scan_geometry.lookup(resolution)?;
        self.ellipsoid.validate()?;
        let projector = FixedGridProjector::new(self.ellipsoid.descriptor_ellipsoid())?;

        let mut xs = [0.0; 4];
        let mut ys = [0.0; 4];
        for (i, &(lon, lat)) in corners.points().iter().enumerate() {
            let (x, y) = projector.project(lon, lat)?;
            xs[i] = x;
            ys[i] = y;
        }

        // Corner selection works on cell spans: one fewer than the counts.
        let cells = ImageDims::new(dims.n_lines - 1, dims.n_columns - 1);
        let selected = select_extent(&xs, &ys, self.options.rule).check_orientation()?;

        let (nominal_x, nominal_y) = coeffs.nadir_pixel_size(self.ellipsoid.satellite_height_m);
        debug!(
            instrument = self.scan_geometry.instrument(),
            resolution = %resolution,
            cell_lines = cells.n_lines,
            cell_columns = cells.n_columns,
            nominal_x,
            nominal_y,
            "Selected area corners"
        );

        let extent = match self.options.convention {
            CornerConvention::Edges => selected,
            CornerConvention::Centers => {
                if cells.n_lines == 0 || cells.n_columns == 0 {
                    return Err(ImagerError::InvalidGeometry(format!(
                        "pixel-centre corners need at least 2x2 pixels, got {}x{}",
                        dims.n_lines, dims.n_columns
                    )));
                }
                let half_x = selected.width() / cells.n_columns as f64 / 2.0;
                let half_y = selected.height() / cells.n_lines as f64 / 2.0;
                AreaExtent {
                    x_min: selected.x_min - half_x,
                    y_min: selected.y_min - half_y,
                    x_max: selected.x_max + half_x,
                    y_max: selected.y_max + half_y,
                }
            }
        };

        // Full counts again for reporting
        let area = AreaDefinition::new(
            &self.naming,
            resolution,
            ProjectionDescriptor::new(&self.ellipsoid, projector.sweep()),
            dims,
            extent,
        )?;

        debug!(
            area_id = area.area_id(),
            pixel_size_x = area.pixel_size_x(),
            pixel_size_y = area.pixel_size_y(),
            "Built area definition from corners"
        );
        Ok(area)
    }

    /// Area definition from the fixed-point scan geometry of a window of
    /// the full-disk grid.
    pub fn build_from_scan_geometry(
        &self,
        resolution: ResolutionTag,
        window: FixedGridWindow,
        direction: ScanDirection,
    ) -> ImagerResult<AreaDefinition> {
        window.dims.validate()?;
        let coeffs = self.scan_geometry.lookup(resolution)?;
        self.ellipsoid.validate()?;
        let projector = FixedGridProjector::new(self.ellipsoid.descriptor_ellipsoid())?;

        let extent = scan_geometry_extent(
            &coeffs,
            &window,
            direction,
            self.ellipsoid.satellite_height_m,
        );

        let area = AreaDefinition::new(
            &self.naming,
            resolution,
            ProjectionDescriptor::new(&self.ellipsoid, projector.sweep()),
            window.dims,
            extent,
        )?;

        debug!(
            area_id = area.area_id(),
            first_line = window.first_line,
            first_column = window.first_column,
            pixel_size_x = area.pixel_size_x(),
            "Built area definition from scan geometry"
        );
        Ok(area)
    }
}

/// Corner-based area definition with default options.
pub fn build_area_definition(
    resolution: ResolutionTag,
    corners: &CornerSet,
    scan_geometry: &dyn ScanGeometryTable,
    ellipsoid: &EllipsoidParameters,
    dims: ImageDims,
    naming: &AreaNaming,
) -> ImagerResult<AreaDefinition> {
    AreaDefinitionBuilder::new(scan_geometry, *ellipsoid, naming.clone()).build(
        resolution,
        corners,
        dims,
    )
}

/// Scan-geometry area definition for a window of the full-disk grid.
pub fn build_area_definition_from_scan_geometry(
    resolution: ResolutionTag,
    window: FixedGridWindow,
    direction: ScanDirection,
    scan_geometry: &dyn ScanGeometryTable,
    ellipsoid: &EllipsoidParameters,
    naming: &AreaNaming,
) -> ImagerResult<AreaDefinition> {
    AreaDefinitionBuilder::new(scan_geometry, *ellipsoid, naming.clone())
        .build_from_scan_geometry(resolution, window, direction)
}

fn select_extent(xs: &[f64; 4], ys: &[f64; 4], rule: CornerRule) -> AreaExtent {
    match rule {
        CornerRule::Positional => AreaExtent {
            x_min: xs[NORTH_WEST],
            y_min: ys[SOUTH_EAST],
            x_max: xs[SOUTH_EAST],
            y_max: ys[NORTH_WEST],
        },
        CornerRule::MinMax => AreaExtent {
            x_min: xs.iter().copied().fold(f64::INFINITY, f64::min),
            y_min: ys.iter().copied().fold(f64::INFINITY, f64::min),
            x_max: xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            y_max: ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        },
    }
}

/// Outer-edge extent of a full-disk window from CFAC/LFAC/COFF/LOFF.
///
/// Pixel `i` spans `[i - 0.5, i + 0.5]`; lines grow southward for
/// north-to-south scans, so their angles are negated.
pub fn scan_geometry_extent(
    coeffs: &ScanGeometryCoefficients,
    window: &FixedGridWindow,
    direction: ScanDirection,
    satellite_height_m: f64,
) -> AreaExtent {
    let to_m = |deg: f64| deg.to_radians() * satellite_height_m;

    let first_col = window.first_column as f64 - 0.5;
    let last_col = (window.first_column + window.dims.n_columns) as f64 - 0.5;
    let first_line = window.first_line as f64 - 0.5;
    let last_line = (window.first_line + window.dims.n_lines) as f64 - 0.5;

    let x_min = to_m(coeffs.column_to_angle(first_col));
    let x_max = to_m(coeffs.column_to_angle(last_col));

    let (y_min, y_max) = match direction {
        ScanDirection::NorthToSouth => (
            -to_m(coeffs.line_to_angle(last_line)),
            -to_m(coeffs.line_to_angle(first_line)),
        ),
        ScanDirection::SouthToNorth => (
            to_m(coeffs.line_to_angle(first_line)),
            to_m(coeffs.line_to_angle(last_line)),
        ),
    };

    AreaExtent {
        x_min,
        y_min,
        x_max,
        y_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan_geometry::GhiScanGeometry;

    fn naming() -> AreaNaming {
        AreaNaming::new("FY-4B", "GHI", "REGX")
    }

    fn corners() -> CornerSet {
        CornerSet::new([(164.7, 60.0), (44.7, -60.0), (44.7, 60.0), (164.7, -60.0)])
    }

    #[test]
    fn test_names() {
        let area = build_area_definition(
            ResolutionTag::R500m,
            &corners(),
            &GhiScanGeometry,
            &EllipsoidParameters::fy4(104.7),
            ImageDims::new(100, 100),
            &naming(),
        )
        .unwrap();
        assert_eq!(area.area_id(), "REGX_500m");
        assert_eq!(area.description(), "GHI REGX area");
        assert_eq!(area.proj_id(), "FY-4B, 500m");
    }

    #[test]
    fn test_pixel_center() {
        let area = build_area_definition(
            ResolutionTag::R2000m,
            &corners(),
            &GhiScanGeometry,
            &EllipsoidParameters::fy4(104.7),
            ImageDims::new(10, 20),
            &naming(),
        )
        .unwrap();
        let (x, y) = area.pixel_center(0, 0).unwrap();
        assert!((x - (area.extent().x_min + area.pixel_size_x() / 2.0)).abs() < 1e-6);
        assert!((y - (area.extent().y_max - area.pixel_size_y() / 2.0)).abs() < 1e-6);
        assert!(area.pixel_center(10, 0).is_none());
    }

    #[test]
    fn test_zero_dims_rejected() {
        let result = build_area_definition(
            ResolutionTag::R2000m,
            &corners(),
            &GhiScanGeometry,
            &EllipsoidParameters::fy4(104.7),
            ImageDims::new(0, 20),
            &naming(),
        );
        assert!(matches!(result, Err(ImagerError::InvalidGeometry(_))));
    }

    #[test]
    fn test_centers_need_two_pixels() {
        let builder = AreaDefinitionBuilder::new(
            &GhiScanGeometry,
            EllipsoidParameters::fy4(104.7),
            naming(),
        )
        .with_options(AreaOptions {
            convention: CornerConvention::Centers,
            rule: CornerRule::Positional,
        });
        let result = builder.build(ResolutionTag::R2000m, &corners(), ImageDims::new(1, 20));
        assert!(matches!(result, Err(ImagerError::InvalidGeometry(_))));
    }

    #[test]
    fn test_proj_string() {
        let descriptor =
            ProjectionDescriptor::new(&EllipsoidParameters::fy4(104.7), SweepAxis::X);
        let proj = descriptor.to_proj_string();
        assert!(proj.contains("+proj=geos"));
        assert!(proj.contains("+lon_0=104.7"));
        assert!(proj.contains("+h=35786000"));
        assert!(proj.contains("+a=6378137"));
        assert!(proj.contains("+rf=297.257"));
        assert!(!proj.contains("+b="));
        assert!(proj.contains("+sweep=x"));

        let dict = descriptor.to_proj_dict();
        assert!(!dict.contains_key("b"));
        assert_eq!(dict["proj"], "geos");
        assert_eq!(dict["units"], "m");
        assert_eq!(dict["sweep"], "x");
    }

    #[test]
    fn test_full_disk_window() {
        let coeffs = GhiScanGeometry.lookup(ResolutionTag::R2000m).unwrap();
        let window = FixedGridWindow::full_disk(&coeffs);
        assert_eq!(window.dims, ImageDims::new(5496, 5496));
    }

    #[test]
    fn test_corner_set_from_attributes() {
        let corners =
            CornerSet::from_lon_lat(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0, 8.0]).unwrap();
        assert_eq!(corners.get(NORTH_WEST), Some((3.0, 7.0)));
        assert_eq!(corners.get(SOUTH_EAST), Some((4.0, 8.0)));
        assert!(CornerSet::from_lon_lat(&[1.0, 2.0, 3.0], &[5.0, 6.0, 7.0]).is_err());
    }
}
