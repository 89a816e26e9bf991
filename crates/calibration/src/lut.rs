//! Count-to-brightness-temperature lookup tables.

use imager_common::{ImagerError, ImagerResult};
use serde::{Deserialize, Serialize};

/// Where a count fell relative to the table's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LutPosition {
    Inside,
    Below,
    Above,
}

/// Piecewise-linear mapping from counts to brightness temperature (K).
///
/// FY-4 files store the table as one temperature per integer count
/// (`CALChannelXX`), which is the special case of knots `0, 1, 2, ...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrightnessTemperatureLut {
    knots: Vec<f64>,
    values: Vec<f64>,
}

impl BrightnessTemperatureLut {
    /// Build from explicit count knots and temperatures.
    ///
    /// Knots must be finite and strictly increasing, with at least two.
    pub fn new(knots: Vec<f64>, values: Vec<f64>) -> ImagerResult<Self> {
        if knots.len() != values.len() {
            return Err(ImagerError::InvalidCalibration(format!(
                "LUT has {} knots but {} values",
                knots.len(),
                values.len()
            )));
        }
        if knots.len() < 2 {
            return Err(ImagerError::InvalidCalibration(
                "LUT needs at least two entries".to_string(),
            ));
        }
        if knots.iter().any(|k| !k.is_finite()) {
            return Err(ImagerError::InvalidCalibration(
                "LUT knots must be finite".to_string(),
            ));
        }
        if knots.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ImagerError::InvalidCalibration(
                "LUT knots must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { knots, values })
    }

    /// Build from a table indexed directly by count.
    pub fn from_table(values: Vec<f64>) -> ImagerResult<Self> {
        let knots = (0..values.len()).map(|i| i as f64).collect();
        Self::new(knots, values)
    }

    pub fn len(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Lowest and highest count covered.
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    /// Temperature for a count. Counts outside the domain clamp to the
    /// nearest edge value. A NaN count gives NaN.
    pub fn evaluate(&self, count: f64) -> (f64, LutPosition) {
        if count.is_nan() {
            return (f64::NAN, LutPosition::Inside);
        }
        let last = self.knots.len() - 1;
        if count < self.knots[0] {
            return (self.values[0], LutPosition::Below);
        }
        if count > self.knots[last] {
            return (self.values[last], LutPosition::Above);
        }

        // First knot strictly greater than the count
        let upper = self.knots.partition_point(|k| *k <= count);
        if upper > last {
            return (self.values[last], LutPosition::Inside);
        }
        let lower = upper - 1;
        let (k0, k1) = (self.knots[lower], self.knots[upper]);
        let (v0, v1) = (self.values[lower], self.values[upper]);
        if count == k0 {
            return (v0, LutPosition::Inside);
        }
        let t = (count - k0) / (k1 - k0);
        (v0 + t * (v1 - v0), LutPosition::Inside)
    }
}
