use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::pledger::{PledgerRecord, Status};

/// Record fields a filter may constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    Name,
    State,
    District,
    Role,
    Status,
    Pledged,
    Incumbent,
}

impl FilterField {
    /// Canonical text of this field on `record`, or `None` when the record
    /// has no value for it.
    pub fn value_of(self, record: &PledgerRecord) -> Option<String> {
        match self {
            FilterField::Name => Some(record.name.clone()),
            FilterField::State => Some(record.state.clone()),
            FilterField::District => record.district.map(|d| d.to_string()),
            FilterField::Role => Some(record.role.clone()),
            FilterField::Status => Some(record.status.label().to_owned()),
            FilterField::Pledged => Some(record.pledged.to_string()),
            FilterField::Incumbent => Some(record.incumbent.to_string()),
        }
    }
}

/// One accepted value as it may appear in JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl FilterValue {
    fn canonical(self) -> String {
        match self {
            FilterValue::Flag(flag) => flag.to_string(),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Text(text) => text,
        }
    }
}

/// Field -> accepted values. A record passes when every constrained field
/// holds one of its accepted values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<FilterField, Vec<FilterValue>>",
    into = "BTreeMap<FilterField, BTreeSet<String>>"
)]
pub struct FilterCriteria {
    fields: BTreeMap<FilterField, BTreeSet<String>>,
}

impl From<BTreeMap<FilterField, Vec<FilterValue>>> for FilterCriteria {
    fn from(raw: BTreeMap<FilterField, Vec<FilterValue>>) -> Self {
        let fields = raw
            .into_iter()
            .map(|(field, values)| (field, values.into_iter().map(FilterValue::canonical).collect()))
            .collect();
        Self { fields }
    }
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses shown on the map unless the user narrows them.
    pub fn default_statuses() -> Self {
        Self::new().with(
            FilterField::Status,
            [Status::Nominee, Status::PrimaryCandidate, Status::Incumbent]
                .iter()
                .map(Status::label),
        )
    }

    pub fn with<I, V>(mut self, field: FilterField, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.set(field, values);
        self
    }

    pub fn set<I, V>(&mut self, field: FilterField, values: I)
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.fields
            .insert(field, values.into_iter().map(|v| v.to_string()).collect());
    }

    pub fn accepted(&self, field: FilterField) -> Option<&BTreeSet<String>> {
        self.fields.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `status` is in the accepted status set. No status constraint
    /// accepts nothing.
    pub fn accepts_status(&self, status: &Status) -> bool {
        self.fields
            .get(&FilterField::Status)
            .is_some_and(|accepted| accepted.contains(status.label()))
    }

    pub fn matches(&self, record: &PledgerRecord) -> bool {
        self.fields.iter().all(|(field, accepted)| {
            field
                .value_of(record)
                .is_some_and(|value| accepted.contains(&value))
        })
    }
}

impl From<FilterCriteria> for BTreeMap<FilterField, BTreeSet<String>> {
    fn from(criteria: FilterCriteria) -> Self {
        criteria.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(district: Option<u32>, status: Status, pledged: bool) -> PledgerRecord {
        PledgerRecord {
            name: "Jane Doe".into(),
            state: "OR".into(),
            district,
            role: "Rep".into(),
            status,
            pledged,
            incumbent: false,
        }
    }

    #[test]
    fn empty_criteria_match_everything() {
        let criteria = FilterCriteria::new();
        assert!(criteria.matches(&record(None, Status::Lost, false)));
    }

    #[test]
    fn every_constrained_field_must_match() {
        let criteria = FilterCriteria::new()
            .with(FilterField::Status, ["Nominee"])
            .with(FilterField::Pledged, [true]);
        assert!(criteria.matches(&record(Some(1), Status::Nominee, true)));
        assert!(!criteria.matches(&record(Some(1), Status::Nominee, false)));
        assert!(!criteria.matches(&record(Some(1), Status::Lost, true)));
    }

    #[test]
    fn missing_field_value_is_excluded() {
        let criteria = FilterCriteria::new().with(FilterField::District, [1, 2, 3]);
        assert!(criteria.matches(&record(Some(2), Status::Nominee, true)));
        assert!(!criteria.matches(&record(None, Status::Nominee, true)));
    }

    #[test]
    fn json_values_are_canonicalized() {
        let criteria: FilterCriteria = serde_json::from_str(
            r#"{"status":["Nominee"],"pledged":[true],"district":[4]}"#,
        )
        .expect("criteria should parse");
        assert!(criteria.matches(&record(Some(4), Status::Nominee, true)));
        assert!(!criteria.matches(&record(Some(5), Status::Nominee, true)));

        let json = serde_json::to_string(&criteria).expect("serialize");
        let reparsed: FilterCriteria = serde_json::from_str(&json).expect("reparse");
        assert_eq!(reparsed, criteria);
    }

    #[test]
    fn accepts_status_without_constraint_is_false() {
        assert!(!FilterCriteria::new().accepts_status(&Status::Nominee));
        assert!(FilterCriteria::default_statuses().accepts_status(&Status::Nominee));
        assert!(!FilterCriteria::default_statuses().accepts_status(&Status::Lost));
    }
}
