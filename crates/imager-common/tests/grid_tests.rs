//! Tests for grids and file values as they cross serialization boundaries.

use imager_common::attrs::{attr_f64, attr_range};
use imager_common::{Attrs, FileValue, Grid, ImagerError, ResolutionTag};
use serde_json::json;

// ============================================================================
// Grids
// ============================================================================

#[test]
fn test_rows_follow_lines() {
    let grid = Grid::from_fn(3, 2, |line, column| (line * 2 + column) as u16);
    let rows: Vec<&[u16]> = grid.rows().collect();
    assert_eq!(rows, vec![&[0, 1][..], &[2, 3][..], &[4, 5][..]]);
}

#[test]
fn test_map_keeps_shape() {
    let counts = Grid::from_vec(2, 3, vec![0u16, 1, 2, 3, 4, 65535]).unwrap();
    let scaled = counts.map(|&c| if c == 65535 { f32::NAN } else { c as f32 * 0.5 });
    assert_eq!(scaled.shape(), (2, 3));
    assert_eq!(*scaled.get(1, 1).unwrap(), 2.0);
    assert_eq!(scaled.missing_count(), 1);
}

#[test]
fn test_get_mut_in_place() {
    let mut grid = Grid::from_vec(2, 2, vec![0u16; 4]).unwrap();
    *grid.get_mut(1, 0).unwrap() = 7;
    assert_eq!(grid.into_vec(), vec![0, 0, 7, 0]);
}

#[test]
fn test_empty_grid() {
    let grid: Grid<u16> = Grid::from_vec(0, 5, Vec::new()).unwrap();
    assert!(grid.is_empty());
    assert_eq!(grid.rows().count(), 0);
}

// ============================================================================
// File values
// ============================================================================

#[test]
fn test_file_value_tagging() {
    let value = FileValue::Counts(Grid::from_vec(1, 2, vec![10u16, 20]).unwrap());
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(
        json,
        json!({"kind": "counts", "value": {"n_lines": 1, "n_columns": 2, "data": [10, 20]}})
    );

    let parsed: FileValue = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, value);
}

#[test]
fn test_file_value_rejects_bad_grid() {
    let json = json!({"kind": "matrix", "value": {"n_lines": 2, "n_columns": 2, "data": [1.0]}});
    assert!(serde_json::from_value::<FileValue>(json).is_err());
}

#[test]
fn test_text_is_not_a_number() {
    let value = FileValue::Text("FY4B".to_string());
    let err = value.as_f64("/attr/Satellite Name").unwrap_err();
    assert!(matches!(
        err,
        ImagerError::MalformedAttribute { ref key, .. } if key == "/attr/Satellite Name"
    ));
}

#[test]
fn test_attribute_helpers() {
    let mut attrs = Attrs::new();
    attrs.insert("FillValue".to_string(), json!([65535]));
    attrs.insert("valid_range".to_string(), json!([0, 4095]));
    attrs.insert("bad_range".to_string(), json!([10, 0]));

    assert_eq!(attr_f64(&attrs, "FillValue").unwrap(), Some(65535.0));
    assert_eq!(attr_f64(&attrs, "missing").unwrap(), None);
    assert_eq!(attr_range(&attrs, "valid_range").unwrap(), Some((0.0, 4095.0)));
    assert!(attr_range(&attrs, "bad_range").is_err());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_geometry_errors() {
    let off_disk = ImagerError::OffDisk { x: 1.0, y: 2.0 };
    assert!(off_disk.is_geometry_error());
    assert!(!ImagerError::KeyNotFound("x".to_string()).is_geometry_error());
}

#[test]
fn test_unsupported_resolution_message() {
    let err = "3km".parse::<ResolutionTag>().unwrap_err();
    assert!(err.to_string().contains("3km"), "{}", err);
}
