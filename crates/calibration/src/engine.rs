//! Count-to-physical conversion.

use imager_common::{Attrs, Grid, ImagerError, ImagerResult};
use num_traits::ToPrimitive;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::lut::{BrightnessTemperatureLut, LutPosition};
use crate::table::{CalibrationTable, QuantityKind, SampleClass};

/// Attributes that describe raw counts. They are removed from calibrated
/// bands so nothing downstream applies them a second time.
pub const CALIBRATION_ATTRS: [&str; 7] = [
    "FillValue",
    "Slope",
    "Intercept",
    "_FillValue",
    "scale_factor",
    "add_offset",
    "valid_range",
];

/// Non-fatal findings from calibrating one band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationCaveats {
    /// Some counts fell outside the lookup table and were clamped.
    pub out_of_calibration_range: bool,
    pub below_range_count: usize,
    pub above_range_count: usize,
    /// Samples equal to the fill value
    pub fill_count: usize,
    /// Samples outside the valid count range
    pub invalid_count: usize,
}

impl CalibrationCaveats {
    fn merge(self, other: Self) -> Self {
        Self {
            out_of_calibration_range: self.out_of_calibration_range
                || other.out_of_calibration_range,
            below_range_count: self.below_range_count + other.below_range_count,
            above_range_count: self.above_range_count + other.above_range_count,
            fill_count: self.fill_count + other.fill_count,
            invalid_count: self.invalid_count + other.invalid_count,
        }
    }

    /// Samples emitted as `NaN`.
    pub fn missing_count(&self) -> usize {
        self.fill_count + self.invalid_count
    }

    /// Record the caveats in band metadata.
    pub fn apply_to(&self, attrs: &mut Attrs) {
        attrs.insert(
            "out_of_calibration_range".to_string(),
            Value::Bool(self.out_of_calibration_range),
        );
        if self.out_of_calibration_range {
            attrs.insert(
                "below_calibration_range_count".to_string(),
                Value::from(self.below_range_count),
            );
            attrs.insert(
                "above_calibration_range_count".to_string(),
                Value::from(self.above_range_count),
            );
        }
    }
}

enum Method<'a> {
    Passthrough,
    Linear { slope: f64, intercept: f64 },
    Lookup(&'a BrightnessTemperatureLut),
}

/// Calibrate a grid of raw counts to `quantity`.
///
/// Fill-valued and out-of-range counts become `NaN` before any arithmetic.
/// Linear conversions are computed in `f64` and narrowed to `f32` at the
/// end. Brightness temperature uses the table's LUT when it has one and the
/// linear coefficients otherwise.
pub fn calibrate_band<T>(
    raw: &Grid<T>,
    table: &CalibrationTable,
    quantity: QuantityKind,
) -> ImagerResult<(Grid<f32>, CalibrationCaveats)>
where
    T: ToPrimitive + Copy + Sync,
{
    let method = select_method(table, quantity)?;

    let n_columns = raw.n_columns().max(1);
    let mut out = vec![f32::NAN; raw.len()];
    let caveats = out
        .par_chunks_mut(n_columns)
        .zip(raw.as_slice().par_chunks(n_columns))
        .map(|(out_row, raw_row)| calibrate_row(raw_row, out_row, table, &method))
        .reduce(CalibrationCaveats::default, CalibrationCaveats::merge);

    if caveats.out_of_calibration_range {
        warn!(
            channel = table.channel(),
            below = caveats.below_range_count,
            above = caveats.above_range_count,
            "Counts outside the calibration table were clamped"
        );
    }
    debug!(
        channel = table.channel(),
        quantity = %quantity,
        fill = caveats.fill_count,
        invalid = caveats.invalid_count,
        "Calibrated band"
    );

    let calibrated = Grid::from_vec(raw.n_lines(), raw.n_columns(), out)?;
    Ok((calibrated, caveats))
}

/// Remove the calibration attributes from a band's metadata.
pub fn strip_calibration_attrs(attrs: &mut Attrs) {
    for key in CALIBRATION_ATTRS {
        attrs.remove(key);
    }
}

fn select_method(table: &CalibrationTable, quantity: QuantityKind) -> ImagerResult<Method<'_>> {
    if quantity == QuantityKind::Counts {
        return Ok(Method::Passthrough);
    }
    if quantity != table.quantity() {
        return Err(ImagerError::InvalidCalibration(format!(
            "{} is calibrated to {}, not {}",
            table.channel(),
            table.quantity(),
            quantity
        )));
    }
    Ok(match (quantity, table.bt_lut()) {
        (QuantityKind::BrightnessTemperature, Some(lut)) => Method::Lookup(lut),
        _ => Method::Linear {
            slope: table.slope(),
            intercept: table.intercept(),
        },
    })
}

fn calibrate_row<T: ToPrimitive + Copy>(
    raw_row: &[T],
    out_row: &mut [f32],
    table: &CalibrationTable,
    method: &Method<'_>,
) -> CalibrationCaveats {
    let mut caveats = CalibrationCaveats::default();
    for (out, raw) in out_row.iter_mut().zip(raw_row) {
        let Some(count) = raw.to_f64() else {
            caveats.invalid_count += 1;
            continue;
        };
        match table.classify(count) {
            SampleClass::Fill => {
                caveats.fill_count += 1;
                continue;
            }
            SampleClass::Invalid => {
                caveats.invalid_count += 1;
                continue;
            }
            SampleClass::Valid => {}
        }

        let value = match method {
            Method::Passthrough => count,
            Method::Linear { slope, intercept } => count * slope + intercept,
            Method::Lookup(lut) => {
                let (value, position) = lut.evaluate(count);
                match position {
                    LutPosition::Inside => {}
                    LutPosition::Below => {
                        caveats.out_of_calibration_range = true;
                        caveats.below_range_count += 1;
                    }
                    LutPosition::Above => {
                        caveats.out_of_calibration_range = true;
                        caveats.above_range_count += 1;
                    }
                }
                value
            }
        };
        *out = value as f32;
    }
    caveats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reflectance_table() -> CalibrationTable {
        CalibrationTable::linear("C02", QuantityKind::Reflectance, 0.01, -20.0)
            .unwrap()
            .with_fill_value(65535.0)
    }

    #[test]
    fn test_linear() {
        let raw = Grid::from_vec(1, 3, vec![0u16, 2000, 4095]).unwrap();
        let (out, caveats) =
            calibrate_band(&raw, &reflectance_table(), QuantityKind::Reflectance).unwrap();
        assert_eq!(out.as_slice(), &[-20.0f32, 0.0, 20.95]);
        assert_eq!(caveats, CalibrationCaveats::default());
    }

    #[test]
    fn test_counts_passthrough_keeps_fill_handling() {
        let raw = Grid::from_vec(1, 2, vec![7u16, 65535]).unwrap();
        let (out, caveats) =
            calibrate_band(&raw, &reflectance_table(), QuantityKind::Counts).unwrap();
        assert_eq!(out.as_slice()[0], 7.0);
        assert!(out.as_slice()[1].is_nan());
        assert_eq!(caveats.fill_count, 1);
    }

    #[test]
    fn test_quantity_mismatch() {
        let raw = Grid::from_vec(1, 1, vec![1u16]).unwrap();
        let result = calibrate_band(
            &raw,
            &reflectance_table(),
            QuantityKind::BrightnessTemperature,
        );
        assert!(matches!(result, Err(ImagerError::InvalidCalibration(_))));
    }

    #[test]
    fn test_strip_calibration_attrs() {
        let mut attrs = Attrs::new();
        for key in CALIBRATION_ATTRS {
            attrs.insert(key.to_string(), Value::from(1.0));
        }
        attrs.insert("units".to_string(), Value::from("1"));
        strip_calibration_attrs(&mut attrs);
        assert_eq!(attrs.len(), 1);
        assert!(attrs.contains_key("units"));
    }

    #[test]
    fn test_caveats_written_to_attrs() {
        let mut attrs = Attrs::new();
        CalibrationCaveats::default().apply_to(&mut attrs);
        assert_eq!(attrs["out_of_calibration_range"], Value::Bool(false));
        assert!(!attrs.contains_key("above_calibration_range_count"));

        let caveats = CalibrationCaveats {
            out_of_calibration_range: true,
            above_range_count: 3,
            ..Default::default()
        };
        caveats.apply_to(&mut attrs);
        assert_eq!(attrs["out_of_calibration_range"], Value::Bool(true));
        assert_eq!(attrs["above_calibration_range_count"], 3);
    }
}
