use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::filter::FilterCriteria;
use crate::pledger::{PledgerRecord, PledgerStore};

/// Partition key inside a state: a district seat or a statewide role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    District(u32),
    Role(String),
}

impl GroupKey {
    /// District 0 is an at-large seat and keeps its own key; labels that do
    /// not parse as numbers already arrive as `None` and fall back to the role.
    pub fn for_record(record: &PledgerRecord) -> Self {
        match record.district {
            Some(district) => GroupKey::District(district),
            None => GroupKey::Role(record.role.clone()),
        }
    }

    pub fn district(&self) -> Option<u32> {
        match self {
            GroupKey::District(d) => Some(*d),
            GroupKey::Role(_) => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::District(d) => d.fmt(f),
            GroupKey::Role(role) => f.write_str(role),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub type StateGroups = BTreeMap<GroupKey, Vec<PledgerRecord>>;
/// State -> partition -> records passing the active filter.
pub type GroupedView = BTreeMap<String, StateGroups>;
/// `None` marks a selected state without data.
pub type StateSlice = BTreeMap<String, Option<StateGroups>>;
/// `None` marks a selected district without data.
pub type DistrictGroups = BTreeMap<GroupKey, Option<Vec<PledgerRecord>>>;
pub type DistrictSlice = BTreeMap<String, Option<DistrictGroups>>;

pub fn total_pledged(store: &PledgerStore) -> usize {
    store
        .values()
        .flat_map(|records| records.iter())
        .filter(|record| record.pledged)
        .count()
}

pub fn pledged_on_ballot(store: &PledgerStore, filter: &FilterCriteria) -> usize {
    store
        .values()
        .flat_map(|records| records.iter())
        .filter(|record| record.pledged && filter.accepts_status(&record.status))
        .count()
}

/// Every record opens its partition; only records passing `filter` are
/// appended, so a partition may be empty.
pub fn group_by_state_and_district(store: &PledgerStore, filter: &FilterCriteria) -> GroupedView {
    store
        .iter()
        .map(|(state, records)| {
            let mut groups = StateGroups::new();
            for record in records {
                let bucket = groups.entry(GroupKey::for_record(record)).or_default();
                if filter.matches(record) {
                    bucket.push(record.clone());
                }
            }
            (state.clone(), groups)
        })
        .collect()
}

pub fn pledgers_by_state(grouped: &GroupedView, selected_state: Option<&str>) -> StateSlice {
    match selected_state {
        None => grouped
            .iter()
            .map(|(state, groups)| (state.clone(), Some(groups.clone())))
            .collect(),
        Some(state) => {
            let mut slice = StateSlice::new();
            slice.insert(state.to_owned(), grouped.get(state).cloned());
            slice
        }
    }
}

pub fn pledgers_by_district(
    by_state: &StateSlice,
    selected_state: Option<&str>,
    selected_districts: &[String],
) -> DistrictSlice {
    let Some(state) = selected_state.filter(|_| !selected_districts.is_empty()) else {
        return by_state
            .iter()
            .map(|(state, groups)| (state.clone(), groups.as_ref().map(wrap_present)))
            .collect();
    };

    let mut slice = DistrictSlice::new();
    let Some(Some(groups)) = by_state.get(state) else {
        slice.insert(state.to_owned(), None);
        return slice;
    };

    let restricted = selected_districts
        .iter()
        .filter_map(|id| id.trim().parse::<u32>().ok())
        .map(|district| {
            let key = GroupKey::District(district);
            let records = groups.get(&key).cloned();
            (key, records)
        })
        .collect();
    slice.insert(state.to_owned(), Some(restricted));
    slice
}

fn wrap_present(groups: &StateGroups) -> DistrictGroups {
    groups
        .iter()
        .map(|(key, records)| (key.clone(), Some(records.clone())))
        .collect()
}
