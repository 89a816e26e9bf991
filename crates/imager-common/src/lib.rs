//! Common types and utilities shared across the FY-4 imager reader crates.

pub mod attrs;
pub mod error;
pub mod grid;
pub mod resolution;

pub use attrs::{Attrs, FileValue};
pub use error::{ImagerError, ImagerResult};
pub use grid::Grid;
pub use resolution::ResolutionTag;
