//! Band loading for one file.
//!
//! The orchestrator ties the file accessor to the navigation and
//! calibration engines: it classifies a band, builds (once per resolution)
//! the area definition, calibrates the counts and assembles the metadata.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use calibration::{
    calibrate_band, strip_calibration_attrs, BrightnessTemperatureLut, CalibrationTable,
    QuantityKind,
};
use imager_common::attrs::{attr_f64, attr_range};
use imager_common::{Attrs, FileValue, ImagerError, ImagerResult, ResolutionTag};
use projection::scan_geometry::channel_number;
use projection::{
    AreaDefinition, AreaDefinitionBuilder, AreaNaming, CornerSet, EllipsoidParameters,
    FixedGridWindow, ImageDims, Instrument,
};
use rayon::prelude::*;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::accessor::FileAccessor;
use crate::band::{default_quantity, Band, NavigationDataset};
use crate::config::{ExtentSource, FailurePolicy, ReaderConfig};
use crate::error::{ReaderError, Result};
use crate::layout::{self, KeyLayout};
use crate::metadata::{platform_name, FileInfo};

/// Heights above this are orbit radii rather than heights above the surface.
const MAX_SATELLITE_HEIGHT_M: f64 = 40_000_000.0;

/// Loads calibrated, geolocated bands from one file.
pub struct BandOrchestrator<A> {
    accessor: A,
    instrument: Instrument,
    file_info: FileInfo,
    config: ReaderConfig,
    layout: KeyLayout,
    areas: Mutex<HashMap<ResolutionTag, ImagerResult<Arc<AreaDefinition>>>>,
}

impl<A: FileAccessor> BandOrchestrator<A> {
    pub fn new(
        accessor: A,
        instrument: Instrument,
        file_info: FileInfo,
        config: ReaderConfig,
    ) -> Result<Self> {
        config.validate()?;
        if file_info.instrument != instrument {
            return Err(ReaderError::InvalidConfig(format!(
                "file is from {} but a {} reader was requested",
                file_info.instrument, instrument
            )));
        }
        Ok(Self {
            accessor,
            instrument,
            file_info,
            config,
            layout: KeyLayout::for_instrument(instrument),
            areas: Mutex::new(HashMap::new()),
        })
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn file_info(&self) -> &FileInfo {
        &self.file_info
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    /// Resolution a band is delivered at in this file.
    ///
    /// Files named with a resolution carry every band at that resolution,
    /// as long as it is not finer than the band's native one.
    pub fn band_resolution(&self, band_name: &str) -> ImagerResult<ResolutionTag> {
        let native = self
            .instrument
            .scan_geometry()
            .classify_band(band_name)
            .ok_or_else(|| ImagerError::UnknownBand(band_name.to_string()))?;
        match self.file_info.resolution {
            Some(file_resolution) if native <= file_resolution => Ok(file_resolution),
            Some(file_resolution) => Err(ImagerError::UnknownBand(format!(
                "{} is not available at {}",
                band_name, file_resolution
            ))),
            None => Ok(native),
        }
    }

    /// Area definition for a resolution, built on first use.
    ///
    /// Failures are remembered too, so every band of a resolution whose
    /// area cannot be built fails the same way.
    pub fn area(&self, resolution: ResolutionTag) -> ImagerResult<Arc<AreaDefinition>> {
        let mut areas = self.areas.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = areas.get(&resolution) {
            return cached.clone();
        }

        let result = self.build_area(resolution).map(Arc::new);
        match &result {
            Ok(area) => debug!(
                resolution = %resolution,
                area_id = area.area_id(),
                "Cached area definition"
            ),
            Err(err) => warn!(
                resolution = %resolution,
                error = %err,
                "Area definition failed, bands at this resolution are suppressed"
            ),
        }
        areas.insert(resolution, result.clone());
        result
    }

    /// Ellipsoid and satellite position from the global attributes.
    pub fn ellipsoid(&self) -> ImagerResult<EllipsoidParameters> {
        let a = to_meters(self.accessor.get_f64(layout::SEMI_MAJOR_AXIS)?);
        let b = to_meters(self.accessor.get_f64(layout::SEMI_MINOR_AXIS)?);
        let h = satellite_height_m(self.accessor.get_f64(layout::SATELLITE_HEIGHT)?, a);
        let lon = self.accessor.get_f64(layout::SUB_SATELLITE_LONGITUDE)?;

        let ellipsoid = EllipsoidParameters::new(a, b, h, lon);
        ellipsoid.validate()?;
        Ok(ellipsoid)
    }

    /// Display name of the platform, preferring the file's own attribute.
    pub fn platform_name(&self) -> ImagerResult<String> {
        let id = self
            .accessor
            .find_text(layout::SATELLITE_NAME)?
            .unwrap_or_else(|| self.file_info.platform_id.clone());
        Ok(platform_name(&id))
    }

    /// Metadata shared by every band of the file.
    pub fn platform_metadata(&self) -> ImagerResult<Attrs> {
        let ellipsoid = self.ellipsoid()?;
        let sensor = self
            .accessor
            .find_text(layout::SENSOR_CODE)?
            .unwrap_or_else(|| self.instrument.name().to_string());
        let latitude = self
            .accessor
            .find_f64(layout::SUB_SATELLITE_LATITUDE)?
            .unwrap_or(0.0);

        let mut attrs = Attrs::new();
        attrs.insert("platform_name".to_string(), json!(self.platform_name()?));
        attrs.insert("sensor".to_string(), json!(sensor.trim().to_lowercase()));
        attrs.insert(
            "orbital_parameters".to_string(),
            json!({
                "satellite_nominal_latitude": latitude,
                "satellite_nominal_longitude": ellipsoid.sub_satellite_longitude_deg,
                "satellite_nominal_altitude": ellipsoid.satellite_height_m,
            }),
        );
        if let Some(start) = self.file_info.start_time {
            attrs.insert("start_time".to_string(), json!(start.to_rfc3339()));
        }
        if let Some(end) = self.file_info.end_time {
            attrs.insert("end_time".to_string(), json!(end.to_rfc3339()));
        }
        Ok(attrs)
    }

    /// Load a band calibrated to its default quantity.
    pub fn load_band(&self, band_name: &str) -> Result<Band> {
        let quantity = default_quantity(self.instrument, band_name).ok_or_else(|| {
            ReaderError::Band {
                band: band_name.to_string(),
                source: ImagerError::UnknownBand(band_name.to_string()),
            }
        })?;
        self.load_band_as(band_name, quantity)
    }

    /// Load a band calibrated to `quantity`.
    pub fn load_band_as(&self, band_name: &str, quantity: QuantityKind) -> Result<Band> {
        self.try_load_band(band_name, quantity)
            .map_err(|source| ReaderError::Band {
                band: band_name.to_string(),
                source,
            })
    }

    /// Load several bands. Areas are prepared once per resolution, then the
    /// bands are calibrated in parallel. Output order follows the request.
    pub fn load_bands<S: AsRef<str> + Sync>(&self, band_names: &[S]) -> Result<Vec<Band>> {
        let resolutions: BTreeSet<ResolutionTag> = band_names
            .iter()
            .filter_map(|name| self.band_resolution(name.as_ref()).ok())
            .collect();
        let prepared = resolutions
            .iter()
            .filter(|resolution| self.area(**resolution).is_ok())
            .count();
        debug!(
            resolutions = resolutions.len(),
            prepared,
            "Prepared area definitions"
        );

        let results: Vec<Result<Band>> = band_names
            .par_iter()
            .map(|name| self.load_band(name.as_ref()))
            .collect();

        let mut bands = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(band) => bands.push(band),
                Err(err) => match self.config.failure_policy {
                    FailurePolicy::SkipBand => warn!(error = %err, "Skipping band"),
                    FailurePolicy::AbortFile => return Err(err),
                },
            }
        }

        info!(
            requested = band_names.len(),
            loaded = bands.len(),
            "Loaded bands"
        );
        Ok(bands)
    }

    /// Resolution navigation variables are stored at: the file's, or the
    /// instrument's coarsest when the file name carries none.
    pub fn navigation_resolution(&self) -> ImagerResult<ResolutionTag> {
        match self.file_info.resolution {
            Some(resolution) => Ok(resolution),
            None => self
                .instrument
                .scan_geometry()
                .resolutions()
                .last()
                .copied()
                .ok_or_else(|| {
                    ImagerError::InvalidGeometry(format!(
                        "{} has no resolutions",
                        self.instrument
                    ))
                }),
        }
    }

    /// Load a navigation variable (solar and satellite angles and the like)
    /// with the file's area and platform metadata. Values are not
    /// calibrated; fill and out-of-range samples become NaN.
    pub fn load_navigation(&self, name: &str) -> Result<NavigationDataset> {
        self.try_load_navigation(name)
            .map_err(|source| ReaderError::Band {
                band: name.to_string(),
                source,
            })
    }

    fn try_load_navigation(&self, name: &str) -> ImagerResult<NavigationDataset> {
        let resolution = self.navigation_resolution()?;
        let area = self.area(resolution)?;

        let key = self.layout.navigation_key(name);
        let mut attrs = self.accessor.attributes(&key)?;
        let table = with_missing_markers(
            CalibrationTable::linear(name, QuantityKind::Counts, 1.0, 0.0)?,
            &attrs,
        )?;
        let (data, caveats) = match self.accessor.get(&key)? {
            FileValue::Matrix(grid) => {
                check_shape(&key, grid.shape(), &area)?;
                calibrate_band(&grid, &table, QuantityKind::Counts)?
            }
            FileValue::Counts(grid) => {
                check_shape(&key, grid.shape(), &area)?;
                calibrate_band(&grid, &table, QuantityKind::Counts)?
            }
            other => {
                return Err(ImagerError::malformed(
                    &key,
                    format!("expected a grid, found {}", other.kind()),
                ))
            }
        };

        attrs.extend(self.platform_metadata()?);
        attrs.insert("name".to_string(), json!(name));
        attrs.insert("file_key".to_string(), json!(key));
        attrs.insert("resolution".to_string(), json!(resolution.meters()));
        strip_calibration_attrs(&mut attrs);

        info!(
            dataset = name,
            resolution = %resolution,
            missing = caveats.missing_count(),
            "Loaded navigation dataset"
        );

        Ok(NavigationDataset {
            name: name.to_string(),
            resolution,
            data,
            area,
            attrs,
        })
    }

    fn try_load_band(&self, band_name: &str, quantity: QuantityKind) -> ImagerResult<Band> {
        let resolution = self.band_resolution(band_name)?;
        let channel = channel_number(band_name)
            .ok_or_else(|| ImagerError::UnknownBand(band_name.to_string()))?;
        let area = self.area(resolution)?;

        let key = self.layout.counts_key(channel);
        let raw = self.accessor.get_counts(&key)?;
        check_shape(&key, raw.shape(), &area)?;

        let mut attrs = self.accessor.attributes(&key)?;
        let table = self.calibration_table(band_name, channel, quantity, &attrs)?;
        let (calibrated, caveats) = calibrate_band(&raw, &table, quantity)?;

        attrs.extend(self.platform_metadata()?);
        attrs.insert("name".to_string(), json!(band_name));
        attrs.insert("file_key".to_string(), json!(key));
        attrs.insert("resolution".to_string(), json!(resolution.meters()));
        attrs.insert("calibration".to_string(), json!(quantity.as_str()));
        attrs.insert("units".to_string(), json!(quantity.units()));
        attrs.insert("standard_name".to_string(), json!(quantity.standard_name()));
        caveats.apply_to(&mut attrs);
        strip_calibration_attrs(&mut attrs);

        info!(
            band = band_name,
            resolution = %resolution,
            quantity = %quantity,
            missing = caveats.missing_count(),
            "Loaded band"
        );

        Ok(Band {
            name: band_name.to_string(),
            resolution,
            quantity,
            raw_counts: raw,
            calibrated,
            area,
            attrs,
            caveats,
        })
    }

    fn build_area(&self, resolution: ResolutionTag) -> ImagerResult<AreaDefinition> {
        let naming = AreaNaming::new(
            self.platform_name()?,
            self.instrument.name(),
            &self.file_info.observation_type,
        );
        let builder =
            AreaDefinitionBuilder::new(self.instrument.scan_geometry(), self.ellipsoid()?, naming)
                .with_options(self.config.area_options());

        match self.config.extent_source.resolve(self.instrument) {
            ExtentSource::ScanGeometry => builder.build_from_scan_geometry(
                resolution,
                self.fixed_grid_window()?,
                self.config.scan_direction,
            ),
            ExtentSource::Corners | ExtentSource::Auto => {
                let corners = CornerSet::from_lon_lat(
                    &self.accessor.get_vector(layout::CORNER_LONGITUDES)?,
                    &self.accessor.get_vector(layout::CORNER_LATITUDES)?,
                )?;
                let dims = ImageDims::new(
                    self.get_index(layout::REGION_LENGTH)?,
                    self.get_index(layout::REGION_WIDTH)?,
                );
                builder.build(resolution, &corners, dims)
            }
        }
    }

    /// Full-disk window from the begin/end line and pixel numbers (0-based).
    fn fixed_grid_window(&self) -> ImagerResult<FixedGridWindow> {
        let begin_line = self.get_index(layout::BEGIN_LINE)?;
        let end_line = self.get_index(layout::END_LINE)?;
        let begin_pixel = self.get_index(layout::BEGIN_PIXEL)?;
        let end_pixel = self.get_index(layout::END_PIXEL)?;
        if end_line < begin_line || end_pixel < begin_pixel {
            return Err(ImagerError::malformed(
                layout::END_LINE,
                format!(
                    "window lines {}..={} and pixels {}..={} are empty",
                    begin_line, end_line, begin_pixel, end_pixel
                ),
            ));
        }
        Ok(FixedGridWindow {
            first_line: begin_line,
            first_column: begin_pixel,
            dims: ImageDims::new(end_line - begin_line + 1, end_pixel - begin_pixel + 1),
        })
    }

    fn calibration_table(
        &self,
        band_name: &str,
        channel: u8,
        quantity: QuantityKind,
        var_attrs: &Attrs,
    ) -> ImagerResult<CalibrationTable> {
        let lut_key = self.layout.lut_key(channel);
        let table = match quantity {
            QuantityKind::Counts => {
                CalibrationTable::linear(band_name, QuantityKind::Counts, 1.0, 0.0)?
            }
            QuantityKind::BrightnessTemperature if self.accessor.contains(&lut_key) => {
                let lut =
                    BrightnessTemperatureLut::from_table(self.accessor.get_vector(&lut_key)?)?;
                CalibrationTable::brightness_temperature(band_name, lut)
            }
            _ => self.linear_table(band_name, channel, quantity, var_attrs)?,
        };
        with_missing_markers(table, var_attrs)
    }

    /// Coefficient-matrix row for the channel, or the variable's own
    /// `Slope`/`Intercept` when the file has no matrix.
    fn linear_table(
        &self,
        band_name: &str,
        channel: u8,
        quantity: QuantityKind,
        var_attrs: &Attrs,
    ) -> ImagerResult<CalibrationTable> {
        let key = self.layout.coefficients_key();
        if self.accessor.contains(&key) {
            let matrix = self.accessor.get_matrix(&key)?;
            return CalibrationTable::from_coefficient_matrix(
                band_name,
                quantity,
                &matrix,
                usize::from(channel) - 1,
            );
        }
        match (
            attr_f64(var_attrs, "Slope")?,
            attr_f64(var_attrs, "Intercept")?,
        ) {
            (Some(slope), Some(intercept)) => {
                CalibrationTable::linear(band_name, quantity, slope, intercept)
            }
            _ => Err(ImagerError::KeyNotFound(key)),
        }
    }

    fn get_index(&self, key: &str) -> ImagerResult<usize> {
        let value = self.accessor.get_f64(key)?;
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(ImagerError::malformed(
                key,
                format!("expected a non-negative integer, got {}", value),
            ));
        }
        Ok(value as usize)
    }
}

/// Apply the variable's fill value and valid range to a table.
fn with_missing_markers(
    mut table: CalibrationTable,
    var_attrs: &Attrs,
) -> ImagerResult<CalibrationTable> {
    let fill = match attr_f64(var_attrs, "FillValue")? {
        Some(fill) => Some(fill),
        None => attr_f64(var_attrs, "_FillValue")?,
    };
    if let Some(fill) = fill {
        table = table.with_fill_value(fill);
    }
    if let Some((lo, hi)) = attr_range(var_attrs, "valid_range")? {
        table = table.with_valid_range(lo, hi)?;
    }
    Ok(table)
}

fn check_shape(key: &str, shape: (usize, usize), area: &AreaDefinition) -> ImagerResult<()> {
    if shape != (area.n_lines(), area.n_columns()) {
        return Err(ImagerError::malformed(
            key,
            format!(
                "grid is {}x{} but the area is {}x{}",
                shape.0,
                shape.1,
                area.n_lines(),
                area.n_columns()
            ),
        ));
    }
    Ok(())
}

/// Lengths in FY-4 files are kilometres; values that are clearly meters
/// are left alone.
fn to_meters(value: f64) -> f64 {
    if value.abs() < 1.0e5 {
        value * 1.0e3
    } else {
        value
    }
}

/// Satellite height above the surface in meters from `NOMSatHeight`, which
/// some files give as an orbit radius.
pub fn satellite_height_m(raw: f64, semi_major_axis_m: f64) -> f64 {
    let height = to_meters(raw);
    if height > MAX_SATELLITE_HEIGHT_M {
        height - semi_major_axis_m
    } else {
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satellite_height_units() {
        assert_eq!(satellite_height_m(35786.0, 6378137.0), 35786000.0);
        assert_eq!(satellite_height_m(35786000.0, 6378137.0), 35786000.0);
        // Orbit radius in km
        let h = satellite_height_m(42164.137, 6378137.0);
        assert!((h - 35786000.0).abs() < 1e-3, "got {}", h);
    }

    #[test]
    fn test_to_meters() {
        assert_eq!(to_meters(6378.137), 6378137.0);
        assert_eq!(to_meters(6378137.0), 6378137.0);
    }
}
