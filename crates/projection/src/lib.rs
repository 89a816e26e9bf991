//! Geostationary fixed-grid navigation.
//!
//! Maps between geographic coordinates and the `geos` projection plane of a
//! satellite parked above the equator, holds the per-instrument fixed-point
//! scan geometry, and derives area definitions for image grids.

pub mod area;
pub mod ellipsoid;
pub mod geostationary;
pub mod scan_geometry;

pub use area::{
    build_area_definition, build_area_definition_from_scan_geometry, AreaDefinition,
    AreaDefinitionBuilder, AreaExtent, AreaNaming, AreaOptions, CornerConvention, CornerRule,
    CornerSet, FixedGridWindow, ImageDims, ProjectionDescriptor, ScanDirection,
};
pub use ellipsoid::EllipsoidParameters;
pub use geostationary::{FixedGridProjector, SweepAxis};
pub use scan_geometry::{
    AgriScanGeometry, GhiScanGeometry, Instrument, ScanGeometryCoefficients, ScanGeometryTable,
};
