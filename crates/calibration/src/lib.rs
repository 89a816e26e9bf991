//! Radiometric calibration of raw imager counts.
//!
//! A [`CalibrationTable`] holds everything needed to turn one channel's
//! counts into a physical quantity; [`calibrate_band`] applies it to a grid.
//! Missing samples are carried as `NaN` in the `f32` output.

pub mod engine;
pub mod lut;
pub mod table;

pub use engine::{calibrate_band, strip_calibration_attrs, CalibrationCaveats, CALIBRATION_ATTRS};
pub use lut::{BrightnessTemperatureLut, LutPosition};
pub use table::{CalibrationTable, QuantityKind};
