use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::feature::FeatureId;

/// A "Do Your Job District" entry: a whole state or one of its districts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DyjCode {
    pub state: String,
    pub district: Option<u32>,
}

impl DyjCode {
    /// Feature to flag and the source it lives in.
    pub fn target(&self) -> Option<(FeatureId, DyjTarget)> {
        match self.district {
            Some(district) => {
                FeatureId::district(&self.state, district).map(|id| (id, DyjTarget::District))
            }
            None => FeatureId::state(&self.state).map(|id| (id, DyjTarget::State)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DyjTarget {
    State,
    District,
}

impl FromStr for DyjCode {
    type Err = String;

    /// `"CA-12"` names a district; `"CA"` or `"CA-Senate"` names the state.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let mut parts = code.splitn(2, '-');
        let state = parts.next().unwrap_or_default().trim();
        if state.is_empty() {
            return Err(format!("empty state in code {code:?}"));
        }
        let district = parts.next().and_then(|d| d.trim().parse::<u32>().ok());
        Ok(Self {
            state: state.to_owned(),
            district,
        })
    }
}

impl fmt::Display for DyjCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.district {
            Some(district) => write!(f, "{}-{district}", self.state),
            None => f.write_str(&self.state),
        }
    }
}

/// Flagged codes. The dataset is an object keyed by code; values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoYourJobDistricts(pub BTreeSet<DyjCode>);

impl DoYourJobDistricts {
    pub fn iter(&self) -> impl Iterator<Item = &DyjCode> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Codes in `state`, or every code when no state is selected.
    pub fn in_state<'a>(&'a self, state: Option<&'a str>) -> impl Iterator<Item = &'a DyjCode> {
        self.0
            .iter()
            .filter(move |code| state.is_none_or(|s| code.state == s))
    }
}

impl FromIterator<DyjCode> for DoYourJobDistricts {
    fn from_iter<I: IntoIterator<Item = DyjCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for DoYourJobDistricts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde::de::IgnoredAny>::deserialize(deserializer)?;
        raw.keys()
            .map(|code| code.parse::<DyjCode>().map_err(serde::de::Error::custom))
            .collect()
    }
}
