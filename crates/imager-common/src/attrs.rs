//! Attribute maps and values returned by file accessors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ImagerError, ImagerResult};
use crate::grid::Grid;

/// Metadata attached to a band or a file variable.
pub type Attrs = BTreeMap<String, Value>;

/// A value fetched from a file by key.
///
/// The accessor never exposes the container's own attribute model; every
/// value is normalised into one of these shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FileValue {
    /// Numeric scalar (integers are widened to f64).
    Scalar(f64),
    /// String attribute.
    Text(String),
    /// 1-D numeric array.
    Vector(Vec<f64>),
    /// 2-D numeric table, e.g. per-channel calibration coefficients.
    Matrix(Grid<f64>),
    /// Raw instrument counts.
    Counts(Grid<u16>),
}

impl FileValue {
    /// Short name of the shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FileValue::Scalar(_) => "scalar",
            FileValue::Text(_) => "text",
            FileValue::Vector(_) => "vector",
            FileValue::Matrix(_) => "matrix",
            FileValue::Counts(_) => "counts",
        }
    }

    /// Interpret as a scalar. One-element vectors are accepted since HDF5
    /// attributes are frequently stored that way.
    pub fn as_f64(&self, key: &str) -> ImagerResult<f64> {
        match self {
            FileValue::Scalar(v) => Ok(*v),
            FileValue::Vector(v) if v.len() == 1 => Ok(v[0]),
            FileValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ImagerError::malformed(key, format!("'{}' is not a number", s))),
            other => Err(ImagerError::malformed(
                key,
                format!("expected scalar, found {}", other.kind()),
            )),
        }
    }

    /// Interpret as a 1-D array.
    pub fn as_vector(&self, key: &str) -> ImagerResult<Vec<f64>> {
        match self {
            FileValue::Vector(v) => Ok(v.clone()),
            FileValue::Scalar(v) => Ok(vec![*v]),
            other => Err(ImagerError::malformed(
                key,
                format!("expected vector, found {}", other.kind()),
            )),
        }
    }

    /// Interpret as text.
    pub fn as_text(&self, key: &str) -> ImagerResult<String> {
        match self {
            FileValue::Text(s) => Ok(s.clone()),
            other => Err(ImagerError::malformed(
                key,
                format!("expected text, found {}", other.kind()),
            )),
        }
    }
}

/// Read a numeric attribute from an attribute map.
pub fn attr_f64(attrs: &Attrs, key: &str) -> ImagerResult<Option<f64>> {
    match attrs.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::Array(items)) if items.len() == 1 => items[0]
            .as_f64()
            .map(Some)
            .ok_or_else(|| ImagerError::malformed(key, "expected a number")),
        Some(other) => Err(ImagerError::malformed(
            key,
            format!("expected a number, found {}", other),
        )),
    }
}

/// Read a two-element `[min, max]` range attribute.
pub fn attr_range(attrs: &Attrs, key: &str) -> ImagerResult<Option<(f64, f64)>> {
    match attrs.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) if items.len() == 2 => {
            let lo = items[0].as_f64();
            let hi = items[1].as_f64();
            match (lo, hi) {
                (Some(lo), Some(hi)) if lo <= hi => Ok(Some((lo, hi))),
                _ => Err(ImagerError::malformed(key, "expected [min, max] with min <= max")),
            }
        }
        Some(other) => Err(ImagerError::malformed(
            key,
            format!("expected [min, max], found {}", other),
        )),
    }
}
