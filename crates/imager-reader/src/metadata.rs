//! File-name parsing and platform metadata.
//!
//! FY-4 Level-1 names look like
//! `FY4B-_GHI---_N_REGX_1330E_L1-_FDI-_MULT_NOM_20220622002000_20220622002459_2000M_V0001.HDF`.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use imager_common::ResolutionTag;
use projection::Instrument;
use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, Result};

/// Platform identifiers and their display names.
pub const PLATFORM_NAMES: [(&str, &str); 3] =
    [("FY4A", "FY-4A"), ("FY4B", "FY-4B"), ("FY4C", "FY-4C")];

/// Display name for a platform identifier; unknown identifiers pass through.
pub fn platform_name(platform_id: &str) -> String {
    let id = platform_id.trim().trim_end_matches('-');
    PLATFORM_NAMES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(id))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| id.to_string())
}

/// Information extracted from an FY-4 Level-1 file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// e.g. "FY4B"
    pub platform_id: String,
    pub instrument: Instrument,
    /// e.g. "REGX", "DISK", "REGC"
    pub observation_type: String,
    /// Nominal sub-satellite longitude from the name, e.g. 133.0 for "1330E"
    pub longitude: Option<f64>,
    /// e.g. "NOM"
    pub projection: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub resolution: Option<ResolutionTag>,
}

impl FileInfo {
    /// Parse a file name or path.
    pub fn parse(file_path: &str) -> Result<Self> {
        let filename = Path::new(file_path)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(file_path);
        let fail = || ReaderError::FileName(filename.to_string());

        let stem = filename.split('.').next().unwrap_or(filename);
        let fields: Vec<&str> = stem.split('_').collect();
        if fields.len() < 4 || fields[2] != "N" {
            return Err(fail());
        }

        let platform_id = fields[0].trim_end_matches('-');
        if !platform_id.to_uppercase().starts_with("FY4") {
            return Err(fail());
        }
        let instrument: Instrument = fields[1].parse().map_err(|_| fail())?;

        Ok(Self {
            platform_id: platform_id.to_string(),
            instrument,
            observation_type: fields[3].to_string(),
            longitude: fields.get(4).and_then(|s| parse_longitude(s)),
            projection: fields.get(8).map(|s| s.to_string()).unwrap_or_default(),
            start_time: fields.get(9).and_then(|s| parse_timestamp(s)),
            end_time: fields.get(10).and_then(|s| parse_timestamp(s)),
            resolution: fields.get(11).and_then(|s| s.parse().ok()),
        })
    }

    /// Minimal info for files whose names carry nothing else.
    pub fn new(
        platform_id: impl Into<String>,
        instrument: Instrument,
        observation_type: impl Into<String>,
    ) -> Self {
        Self {
            platform_id: platform_id.into(),
            instrument,
            observation_type: observation_type.into(),
            longitude: None,
            projection: String::new(),
            start_time: None,
            end_time: None,
            resolution: None,
        }
    }

    pub fn platform_name(&self) -> String {
        platform_name(&self.platform_id)
    }
}

/// "1330E" -> 133.0, "0995W" -> -99.5
fn parse_longitude(s: &str) -> Option<f64> {
    let (digits, sign) = match s.chars().last()? {
        'E' | 'e' => (&s[..s.len() - 1], 1.0),
        'W' | 'w' => (&s[..s.len() - 1], -1.0),
        _ => return None,
    };
    let tenths: u32 = digits.parse().ok()?;
    Some(sign * tenths as f64 / 10.0)
}

/// YYYYMMDDHHMMSS
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.len() != 14 {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}
