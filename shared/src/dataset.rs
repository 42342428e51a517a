use serde::Serialize;

use crate::dictionaries;
use crate::dyj::DoYourJobDistricts;
use crate::grouping;
use crate::pledger::PledgerStore;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("record {index} under {key} belongs to state {found}")]
    StateMismatch {
        key: String,
        index: usize,
        found: String,
    },
}

/// Parse the pledger dataset and check every record sits under its own
/// state's key.
pub fn parse_pledgers(bytes: &[u8]) -> Result<PledgerStore, DatasetError> {
    let store: PledgerStore =
        serde_json::from_slice(bytes).map_err(|source| DatasetError::Parse {
            what: "pledger dataset",
            source,
        })?;
    for (key, records) in &store {
        if let Some((index, record)) = records
            .iter()
            .enumerate()
            .find(|(_, record)| record.state != *key)
        {
            return Err(DatasetError::StateMismatch {
                key: key.clone(),
                index,
                found: record.state.clone(),
            });
        }
    }
    Ok(store)
}

pub fn parse_do_your_job_districts(bytes: &[u8]) -> Result<DoYourJobDistricts, DatasetError> {
    serde_json::from_slice(bytes).map_err(|source| DatasetError::Parse {
        what: "do-your-job districts",
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub states: usize,
    pub records: usize,
    pub pledged: usize,
    /// Keys that are not in the state dictionary; they will never be drawn.
    pub unknown_states: usize,
}

impl DatasetSummary {
    pub fn of(store: &PledgerStore) -> Self {
        Self {
            states: store.len(),
            records: store.values().map(Vec::len).sum(),
            pledged: grouping::total_pledged(store),
            unknown_states: store
                .keys()
                .filter(|abbr| dictionaries::state_by_abbr(abbr).is_none())
                .count(),
        }
    }
}
