//! Key/value access to the contents of a Level-1 file.
//!
//! Keys follow the HDF path layout of FY-4 files: variables by path
//! (`Data/NOMChannel07`) and global attributes as `/attr/<name>`
//! (`/attr/NOMSubSatLon`). Container parsing lives outside this crate;
//! anything that can answer these lookups can drive the orchestrator.

use std::collections::BTreeMap;

use imager_common::{Attrs, FileValue, Grid, ImagerError, ImagerResult};
use serde::{Deserialize, Serialize};

/// Read-only view of a file.
pub trait FileAccessor: Send + Sync {
    /// Fetch a variable or global attribute.
    fn get(&self, key: &str) -> ImagerResult<FileValue>;

    /// Attributes attached to a variable. Variables without attributes
    /// yield an empty map.
    fn attributes(&self, key: &str) -> ImagerResult<Attrs>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    fn get_f64(&self, key: &str) -> ImagerResult<f64> {
        self.get(key)?.as_f64(key)
    }

    fn get_vector(&self, key: &str) -> ImagerResult<Vec<f64>> {
        self.get(key)?.as_vector(key)
    }

    fn get_text(&self, key: &str) -> ImagerResult<String> {
        self.get(key)?.as_text(key)
    }

    fn get_counts(&self, key: &str) -> ImagerResult<Grid<u16>> {
        match self.get(key)? {
            FileValue::Counts(grid) => Ok(grid),
            other => Err(ImagerError::malformed(
                key,
                format!("expected counts, found {}", other.kind()),
            )),
        }
    }

    fn get_matrix(&self, key: &str) -> ImagerResult<Grid<f64>> {
        match self.get(key)? {
            FileValue::Matrix(grid) => Ok(grid),
            other => Err(ImagerError::malformed(
                key,
                format!("expected a matrix, found {}", other.kind()),
            )),
        }
    }

    /// Like [`get_f64`](Self::get_f64) but `None` when the key is absent.
    fn find_f64(&self, key: &str) -> ImagerResult<Option<f64>> {
        match self.get(key) {
            Ok(value) => value.as_f64(key).map(Some),
            Err(ImagerError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Like [`get_text`](Self::get_text) but `None` when the key is absent.
    fn find_text(&self, key: &str) -> ImagerResult<Option<String>> {
        match self.get(key) {
            Ok(value) => value.as_text(key).map(Some),
            Err(ImagerError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// In-memory file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryAccessor {
    #[serde(default)]
    values: BTreeMap<String, FileValue>,
    #[serde(default)]
    attributes: BTreeMap<String, Attrs>,
}

impl MemoryAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FileValue) -> &mut Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn insert_attrs(&mut self, key: impl Into<String>, attrs: Attrs) -> &mut Self {
        self.attributes.insert(key.into(), attrs);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<FileValue> {
        self.attributes.remove(key);
        self.values.remove(key)
    }
}

impl FileAccessor for MemoryAccessor {
    fn get(&self, key: &str) -> ImagerResult<FileValue> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ImagerError::KeyNotFound(key.to_string()))
    }

    fn attributes(&self, key: &str) -> ImagerResult<Attrs> {
        match self.attributes.get(key) {
            Some(attrs) => Ok(attrs.clone()),
            None if self.values.contains_key(key) => Ok(Attrs::new()),
            None => Err(ImagerError::KeyNotFound(key.to_string())),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}
