//! Nominal instrument resolutions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ImagerError;

/// Nominal sub-satellite-point resolution of an imager channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResolutionTag {
    R250m,
    R500m,
    R1000m,
    R2000m,
    R4000m,
}

impl ResolutionTag {
    /// All tags, finest first.
    pub const ALL: [ResolutionTag; 5] = [
        ResolutionTag::R250m,
        ResolutionTag::R500m,
        ResolutionTag::R1000m,
        ResolutionTag::R2000m,
        ResolutionTag::R4000m,
    ];

    /// Nominal pixel size at nadir in meters.
    pub fn meters(&self) -> u32 {
        match self {
            ResolutionTag::R250m => 250,
            ResolutionTag::R500m => 500,
            ResolutionTag::R1000m => 1000,
            ResolutionTag::R2000m => 2000,
            ResolutionTag::R4000m => 4000,
        }
    }

    /// Look up a tag by its nominal meters.
    pub fn from_meters(meters: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.meters() == meters)
    }

    /// Canonical string form, e.g. `"2000m"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTag::R250m => "250m",
            ResolutionTag::R500m => "500m",
            ResolutionTag::R1000m => "1000m",
            ResolutionTag::R2000m => "2000m",
            ResolutionTag::R4000m => "4000m",
        }
    }
}

impl fmt::Display for ResolutionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionTag {
    type Err = ImagerError;

    /// Accepts `"500m"`, `"500M"`, `"500"`, `"2km"` and `"2KM"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let meters = if let Some(km) = lower.strip_suffix("km") {
            km.trim().parse::<f64>().ok().map(|km| km * 1000.0)
        } else {
            lower
                .strip_suffix('m')
                .unwrap_or(&lower)
                .trim()
                .parse::<f64>()
                .ok()
        };

        meters
            .filter(|m| m.fract() == 0.0 && *m > 0.0)
            .and_then(|m| Self::from_meters(m as u32))
            .ok_or_else(|| ImagerError::UnsupportedResolution {
                instrument: "FY-4".to_string(),
                resolution: s.to_string(),
            })
    }
}

impl TryFrom<String> for ResolutionTag {
    type Error = ImagerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResolutionTag> for String {
    fn from(tag: ResolutionTag) -> Self {
        tag.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("2km".parse::<ResolutionTag>().unwrap(), ResolutionTag::R2000m);
        assert_eq!("2000m".parse::<ResolutionTag>().unwrap(), ResolutionTag::R2000m);
        assert_eq!("2000M".parse::<ResolutionTag>().unwrap(), ResolutionTag::R2000m);
        assert_eq!("250".parse::<ResolutionTag>().unwrap(), ResolutionTag::R250m);
        assert_eq!("0.5km".parse::<ResolutionTag>().unwrap(), ResolutionTag::R500m);
        assert_eq!("4KM".parse::<ResolutionTag>().unwrap(), ResolutionTag::R4000m);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("3km".parse::<ResolutionTag>().is_err());
        assert!("fine".parse::<ResolutionTag>().is_err());
        assert!("".parse::<ResolutionTag>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for tag in ResolutionTag::ALL {
            assert_eq!(tag.to_string().parse::<ResolutionTag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ResolutionTag::R500m).unwrap();
        assert_eq!(json, "\"500m\"");
        let tag: ResolutionTag = serde_json::from_str("\"4km\"").unwrap();
        assert_eq!(tag, ResolutionTag::R4000m);
    }
}
