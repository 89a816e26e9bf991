//! Tests for the geostationary fixed-grid projector.

use imager_common::ImagerError;
use projection::{EllipsoidParameters, FixedGridProjector, SweepAxis};
use test_utils::fixtures::{corners, geometry};
use test_utils::{assert_approx_eq, assert_coords_approx_eq};

fn fy4b() -> FixedGridProjector {
    FixedGridProjector::new(EllipsoidParameters::new(
        geometry::SEMI_MAJOR_AXIS_M,
        geometry::SEMI_MINOR_AXIS_M,
        geometry::SATELLITE_HEIGHT_M,
        geometry::FY4B_LONGITUDE,
    ))
    .unwrap()
}

// ============================================================================
// Forward projection
// ============================================================================

#[test]
fn test_project_symmetric_corners() {
    let proj = fy4b();
    let expected = [
        (corners::SYMMETRIC_60_X, corners::SYMMETRIC_60_Y),
        (-corners::SYMMETRIC_60_X, -corners::SYMMETRIC_60_Y),
        (-corners::SYMMETRIC_60_X, corners::SYMMETRIC_60_Y),
        (corners::SYMMETRIC_60_X, -corners::SYMMETRIC_60_Y),
    ];
    for (&(lon, lat), &(ex, ey)) in corners::SYMMETRIC_60.iter().zip(expected.iter()) {
        let (x, y) = proj.project(lon, lat).unwrap();
        assert_coords_approx_eq!((x, y), (ex, ey), 1e-3);
    }
}

#[test]
fn test_project_equator_point() {
    let (x, y) = fy4b().project(geometry::FY4B_LONGITUDE + 10.0, 0.0).unwrap();
    assert_approx_eq!(x, geometry::EQUATOR_PLUS_10_X, 1e-3);
    assert_approx_eq!(y, 0.0, 1e-6);
}

#[test]
fn test_project_is_antisymmetric() {
    let proj = fy4b();
    let (x1, y1) = proj.project(120.0, 25.0).unwrap();
    let (x2, y2) = proj.project(89.4, -25.0).unwrap();
    assert_approx_eq!(x1, -x2, 1e-6);
    assert_approx_eq!(y1, -y2, 1e-6);
}

#[test]
fn test_north_is_positive_y_east_is_positive_x() {
    let (x, y) = fy4b().project(110.0, 30.0).unwrap();
    assert!(x > 0.0);
    assert!(y > 0.0);
}

#[test]
fn test_project_wraps_longitude() {
    let proj = fy4b();
    let a = proj.project(104.7 + 360.0, 10.0).unwrap();
    let b = proj.project(104.7, 10.0).unwrap();
    assert_coords_approx_eq!(a, b, 1e-6);
}

// ============================================================================
// Off-disk handling
// ============================================================================

#[test]
fn test_project_behind_limb() {
    let proj = fy4b();
    for (lon, lat) in [(-75.3, 0.0), (104.7 + 85.0, 0.0), (104.7, 89.0)] {
        let result = proj.project(lon, lat);
        assert!(
            matches!(result, Err(ImagerError::OffDisk { .. })),
            "({}, {}) should be off disk, got {:?}",
            lon,
            lat,
            result
        );
    }
}

#[test]
fn test_project_non_finite() {
    let proj = fy4b();
    assert!(proj.project(f64::NAN, 0.0).is_err());
    assert!(proj.project(0.0, f64::INFINITY).is_err());
}

#[test]
fn test_unproject_space() {
    let result = fy4b().unproject(6.0e6, 0.0);
    assert!(matches!(result, Err(ImagerError::OffDisk { .. })));
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_grid() {
    let proj = fy4b();
    let mut worst: f64 = 0.0;
    for lat_step in -12..=12 {
        for lon_step in -12..=12 {
            let lat = lat_step as f64 * 5.0;
            let lon = geometry::FY4B_LONGITUDE + lon_step as f64 * 5.0;
            let Ok((x, y)) = proj.project(lon, lat) else {
                continue;
            };
            let (lon2, lat2) = proj.unproject(x, y).unwrap();
            let dlon = (lon2 - projection::geostationary::wrap_longitude(lon)).abs();
            worst = worst.max(dlon).max((lat2 - lat).abs());
        }
    }
    assert!(worst < 1e-6, "worst round-trip error {} degrees", worst);
}

#[test]
fn test_round_trip_y_sweep() {
    let proj =
        FixedGridProjector::with_sweep(EllipsoidParameters::fy4(140.7), SweepAxis::Y).unwrap();
    let (x, y) = proj.project(150.0, -35.0).unwrap();
    let (lon, lat) = proj.unproject(x, y).unwrap();
    assert_coords_approx_eq!((lon, lat), (150.0, -35.0), 1e-6);
}

#[test]
fn test_round_trip_across_antimeridian() {
    let proj = FixedGridProjector::new(EllipsoidParameters::fy4(170.0)).unwrap();
    let (x, y) = proj.project(-170.0, 10.0).unwrap();
    assert!(x > 0.0);
    let (lon, lat) = proj.unproject(x, y).unwrap();
    assert_coords_approx_eq!((lon, lat), (-170.0, 10.0), 1e-6);
}

// ============================================================================
// Determinism and parameters
// ============================================================================

#[test]
fn test_projectors_with_same_parameters_agree() {
    let a = fy4b();
    let b = fy4b();
    for (lon, lat) in corners::SYMMETRIC_60 {
        let pa = a.project(lon, lat).unwrap();
        let pb = b.project(lon, lat).unwrap();
        assert_eq!(pa.0.to_bits(), pb.0.to_bits());
        assert_eq!(pa.1.to_bits(), pb.1.to_bits());
    }
}

#[test]
fn test_invalid_ellipsoid_rejected() {
    let params = EllipsoidParameters::new(6378137.0, 6356752.3, -1.0, 104.7);
    assert!(matches!(
        FixedGridProjector::new(params),
        Err(ImagerError::InvalidGeometry(_))
    ));
}

#[test]
fn test_max_scan_angle() {
    let proj = fy4b();
    // asin(a / (a + h)) is about 8.7 degrees
    assert_approx_eq!(proj.max_scan_angle().to_degrees(), 8.7, 0.01);
}
