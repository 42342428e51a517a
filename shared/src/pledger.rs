use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// State abbreviation -> pledgers in dataset order.
pub type PledgerStore = BTreeMap<String, Vec<PledgerRecord>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PledgerRecord {
    pub name: String,
    pub state: String,
    /// `None` for statewide roles (Senate, Governor, ...).
    #[serde(default, deserialize_with = "deserialize_district")]
    pub district: Option<u32>,
    #[serde(default)]
    pub role: String,
    pub status: Status,
    #[serde(default)]
    pub pledged: bool,
    #[serde(default)]
    pub incumbent: bool,
}

impl PledgerRecord {
    /// `ST-07` for district seats, `ST-Senate` for statewide ones.
    pub fn seat_label(&self) -> String {
        match self.district {
            Some(district) => format!("{}-{district}", self.state),
            None => format!("{}-{}", self.state, self.role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Nominee,
    PrimaryCandidate,
    Incumbent,
    Lost,
    Withdrawn,
    Other(String),
}

impl Status {
    pub fn label(&self) -> &str {
        match self {
            Status::Nominee => "Nominee",
            Status::PrimaryCandidate => "Primary Candidate",
            Status::Incumbent => "Incumbent",
            Status::Lost => "Lost",
            Status::Withdrawn => "Withdrawn",
            Status::Other(label) => label,
        }
    }
}

impl From<String> for Status {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Nominee" => Status::Nominee,
            "Primary Candidate" => Status::PrimaryCandidate,
            "Incumbent" => Status::Incumbent,
            "Lost" => Status::Lost,
            "Withdrawn" => Status::Withdrawn,
            _ => Status::Other(label),
        }
    }
}

impl From<&str> for Status {
    fn from(label: &str) -> Self {
        Status::from(label.to_owned())
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.label().to_owned()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts `7`, `"7"`, `"07"`, `null`, `""` or a label such as `"At-Large"`.
/// Anything that is not a non-negative integer means "no district".
fn deserialize_district<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDistrict {
        Number(u64),
        Float(f64),
        Text(String),
    }

    let raw = Option::<RawDistrict>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawDistrict::Number(n)) => u32::try_from(n).ok(),
        Some(RawDistrict::Float(f)) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
            Some(f as u32)
        }
        Some(RawDistrict::Float(_)) => None,
        Some(RawDistrict::Text(text)) => text.trim().parse::<u32>().ok(),
        None => None,
    })
}
