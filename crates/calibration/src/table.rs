//! Per-channel calibration tables.

use std::fmt;
use std::str::FromStr;

use imager_common::{Grid, ImagerError, ImagerResult};
use serde::{Deserialize, Serialize};

use crate::lut::BrightnessTemperatureLut;

/// Physical quantity a band is calibrated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    /// Raw counts, fill handling only
    Counts,
    Reflectance,
    Radiance,
    BrightnessTemperature,
}

impl QuantityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityKind::Counts => "counts",
            QuantityKind::Reflectance => "reflectance",
            QuantityKind::Radiance => "radiance",
            QuantityKind::BrightnessTemperature => "brightness_temperature",
        }
    }

    /// CF standard name of the calibrated quantity.
    pub fn standard_name(&self) -> &'static str {
        match self {
            QuantityKind::Counts => "counts",
            QuantityKind::Reflectance => "toa_bidirectional_reflectance",
            QuantityKind::Radiance => "toa_outgoing_radiance_per_unit_wavelength",
            QuantityKind::BrightnessTemperature => "toa_brightness_temperature",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            QuantityKind::Counts | QuantityKind::Reflectance => "1",
            QuantityKind::Radiance => "W m-2 um-1 sr-1",
            QuantityKind::BrightnessTemperature => "K",
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantityKind {
    type Err = ImagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "counts" => Ok(QuantityKind::Counts),
            "reflectance" => Ok(QuantityKind::Reflectance),
            "radiance" => Ok(QuantityKind::Radiance),
            "brightness_temperature" | "bt" => Ok(QuantityKind::BrightnessTemperature),
            _ => Err(ImagerError::InvalidCalibration(format!(
                "unknown calibration quantity '{}'",
                s
            ))),
        }
    }
}

/// Everything needed to calibrate one channel.
///
/// Tables are validated on construction and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    channel: String,
    quantity: QuantityKind,
    slope: f64,
    intercept: f64,
    fill_value: Option<f64>,
    valid_range: Option<(f64, f64)>,
    bt_lut: Option<BrightnessTemperatureLut>,
}

impl CalibrationTable {
    /// Linear table: `value = count * slope + intercept`.
    pub fn linear(
        channel: impl Into<String>,
        quantity: QuantityKind,
        slope: f64,
        intercept: f64,
    ) -> ImagerResult<Self> {
        let channel = channel.into();
        if !slope.is_finite() || !intercept.is_finite() {
            return Err(ImagerError::InvalidCalibration(format!(
                "{}: slope {} and intercept {} must be finite",
                channel, slope, intercept
            )));
        }
        Ok(Self {
            channel,
            quantity,
            slope,
            intercept,
            fill_value: None,
            valid_range: None,
            bt_lut: None,
        })
    }

    /// Brightness temperature table backed by a lookup table.
    ///
    /// The linear coefficients are kept for reporting only.
    pub fn brightness_temperature(
        channel: impl Into<String>,
        lut: BrightnessTemperatureLut,
    ) -> Self {
        Self {
            channel: channel.into(),
            quantity: QuantityKind::BrightnessTemperature,
            slope: 1.0,
            intercept: 0.0,
            fill_value: None,
            valid_range: None,
            bt_lut: Some(lut),
        }
    }

    /// Linear table from row `channel_index` of a `(n_channels, 2)`
    /// `[slope, intercept]` coefficient matrix.
    pub fn from_coefficient_matrix(
        channel: impl Into<String>,
        quantity: QuantityKind,
        matrix: &Grid<f64>,
        channel_index: usize,
    ) -> ImagerResult<Self> {
        let channel = channel.into();
        if matrix.n_columns() < 2 {
            return Err(ImagerError::InvalidCalibration(format!(
                "coefficient matrix needs 2 columns, has {}",
                matrix.n_columns()
            )));
        }
        match (matrix.get(channel_index, 0), matrix.get(channel_index, 1)) {
            (Some(&slope), Some(&intercept)) => Self::linear(channel, quantity, slope, intercept),
            _ => Err(ImagerError::InvalidCalibration(format!(
                "{}: coefficients only cover {} channels",
                channel,
                matrix.n_lines()
            ))),
        }
    }

    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = Some(fill_value);
        self
    }

    /// Restrict valid raw counts to `[lo, hi]`.
    pub fn with_valid_range(mut self, lo: f64, hi: f64) -> ImagerResult<Self> {
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(ImagerError::InvalidCalibration(format!(
                "{}: valid range [{}, {}] is empty",
                self.channel, lo, hi
            )));
        }
        self.valid_range = Some((lo, hi));
        Ok(self)
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn quantity(&self) -> QuantityKind {
        self.quantity
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn fill_value(&self) -> Option<f64> {
        self.fill_value
    }

    pub fn valid_range(&self) -> Option<(f64, f64)> {
        self.valid_range
    }

    pub fn bt_lut(&self) -> Option<&BrightnessTemperatureLut> {
        self.bt_lut.as_ref()
    }

    /// Whether a raw count is missing: the fill value, not a number, or
    /// outside the valid range.
    pub(crate) fn classify(&self, count: f64) -> SampleClass {
        if !count.is_finite() {
            return SampleClass::Invalid;
        }
        if self.fill_value == Some(count) {
            return SampleClass::Fill;
        }
        match self.valid_range {
            Some((lo, hi)) if count < lo || count > hi => SampleClass::Invalid,
            _ => SampleClass::Valid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SampleClass {
    Valid,
    Fill,
    Invalid,
}
