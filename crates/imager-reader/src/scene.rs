//! File contents dumped to YAML.
//!
//! A scene pairs a file name with the values an accessor would return for
//! it. The CLI and the tests drive the orchestrator from scenes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::accessor::MemoryAccessor;
use crate::config::ReaderConfig;
use crate::error::Result;
use crate::metadata::FileInfo;
use crate::orchestrator::BandOrchestrator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Original Level-1 file name, parsed for platform and timing.
    pub file_name: String,
    #[serde(default)]
    pub contents: MemoryAccessor,
}

impl Scene {
    pub fn new(file_name: impl Into<String>, contents: MemoryAccessor) -> Self {
        Self {
            file_name: file_name.into(),
            contents,
        }
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn file_info(&self) -> Result<FileInfo> {
        FileInfo::parse(&self.file_name)
    }

    /// Build an orchestrator for the instrument named in the file name.
    pub fn into_orchestrator(
        self,
        config: ReaderConfig,
    ) -> Result<BandOrchestrator<MemoryAccessor>> {
        let file_info = self.file_info()?;
        let instrument = file_info.instrument;
        BandOrchestrator::new(self.contents, instrument, file_info, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::FileAccessor;

    const SCENE: &str = r#"
file_name: FY4A-_AGRI--_N_DISK_1047E_L1-_FDI-_MULT_NOM_20190101000000_20190101001459_4000M_V0001.HDF
contents:
  values:
    /attr/NOMSubSatLon:
      kind: scalar
      value: 104.7
"#;

    #[test]
    fn test_from_yaml_str() {
        let scene = Scene::from_yaml_str(SCENE).unwrap();
        let info = scene.file_info().unwrap();
        assert_eq!(info.platform_id, "FY4A");
        assert_eq!(scene.contents.get_f64("/attr/NOMSubSatLon").unwrap(), 104.7);
    }

    #[test]
    fn test_bad_file_name() {
        let scene = Scene::new("not_a_level1_file.HDF", MemoryAccessor::new());
        assert!(scene.into_orchestrator(ReaderConfig::default()).is_err());
    }
}
