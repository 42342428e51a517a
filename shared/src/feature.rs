use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dictionaries;

/// Numeric id shared by a boundary feature and the data styled onto it.
///
/// States use their FIPS code (`06` -> 6); districts append the two-digit
/// district number (`06` + `12` -> 612).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub u64);

impl FeatureId {
    pub fn state(abbr: &str) -> Option<Self> {
        let fips = dictionaries::fips(abbr)?;
        Self::from_geoid(fips)
    }

    pub fn district(abbr: &str, district: u32) -> Option<Self> {
        let fips = dictionaries::fips(abbr)?;
        Self::from_geoid(&format!("{fips}{}", dictionaries::zero_padding(district)))
    }

    /// Parse a GEOID string such as `"0612"`.
    pub fn from_geoid(geoid: &str) -> Option<Self> {
        if geoid.is_empty() || !geoid.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        geoid.parse().ok().map(Self)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
