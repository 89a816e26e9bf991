//! Band orchestration for FY-4 AGRI and GHI Level-1 files.
//!
//! Reads raw counts and calibration tables through a [`FileAccessor`],
//! calibrates them with the `calibration` crate and attaches a shared
//! [`AreaDefinition`](projection::AreaDefinition) per resolution.

pub mod accessor;
pub mod band;
pub mod config;
pub mod error;
pub mod layout;
pub mod metadata;
pub mod orchestrator;
pub mod scene;

pub use accessor::{FileAccessor, MemoryAccessor};
pub use band::{default_quantity, Band, NavigationDataset};
pub use config::{ExtentSource, FailurePolicy, ReaderConfig};
pub use error::{ReaderError, Result};
pub use layout::KeyLayout;
pub use metadata::{platform_name, FileInfo, PLATFORM_NAMES};
pub use orchestrator::{satellite_height_m, BandOrchestrator};
pub use scene::Scene;
