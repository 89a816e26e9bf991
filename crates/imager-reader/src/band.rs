//! Calibrated, geolocated bands.

use std::sync::Arc;

use calibration::{CalibrationCaveats, QuantityKind};
use imager_common::{Attrs, Grid, ResolutionTag};
use projection::{scan_geometry::channel_number, AreaDefinition, Instrument};

/// One loaded channel.
#[derive(Debug, Clone)]
pub struct Band {
    /// Channel name, e.g. "C07"
    pub name: String,
    pub resolution: ResolutionTag,
    pub quantity: QuantityKind,
    pub raw_counts: Grid<u16>,
    pub calibrated: Grid<f32>,
    /// Shared by every band of the same resolution
    pub area: Arc<AreaDefinition>,
    pub attrs: Attrs,
    pub caveats: CalibrationCaveats,
}

impl Band {
    pub fn shape(&self) -> (usize, usize) {
        self.calibrated.shape()
    }

    /// `(min, max)` over non-missing samples, `None` if all are missing.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.calibrated
            .as_slice()
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// A navigation variable such as `NOMSunZenith`, on the file's grid.
#[derive(Debug, Clone)]
pub struct NavigationDataset {
    pub name: String,
    pub resolution: ResolutionTag,
    /// Values with fill and out-of-range samples set to NaN
    pub data: Grid<f32>,
    pub area: Arc<AreaDefinition>,
    pub attrs: Attrs,
}

impl NavigationDataset {
    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }
}

/// Quantity a channel is calibrated to unless the caller asks otherwise:
/// reflectance for the solar channels, brightness temperature for the
/// thermal ones.
pub fn default_quantity(instrument: Instrument, band_name: &str) -> Option<QuantityKind> {
    let channel = channel_number(band_name)?;
    let last_solar = match instrument {
        Instrument::Agri | Instrument::Ghi => 6,
    };
    Some(if channel <= last_solar {
        QuantityKind::Reflectance
    } else {
        QuantityKind::BrightnessTemperature
    })
}
