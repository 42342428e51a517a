use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use pledge_map_shared::dataset::{parse_do_your_job_districts, parse_pledgers};
use pledge_map_shared::{DatasetError, DatasetSummary};
use tracing::{info, warn};

use crate::config::{DYJ_FILE, PLEDGERS_FILE};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// A dataset body kept exactly as read, with a content-derived ETag.
#[derive(Debug, Clone)]
pub struct CachedJson {
    pub body: Bytes,
    pub etag: String,
}

impl CachedJson {
    fn new(name: &str, body: Bytes) -> Self {
        let etag = format!("\"{name}-{:08x}\"", crc32fast::hash(&body));
        Self { body, etag }
    }
}

/// Both datasets, validated once at startup.
#[derive(Debug)]
pub struct Datasets {
    pub pledgers: CachedJson,
    pub do_your_job_districts: CachedJson,
    pub summary: DatasetSummary,
    pub dyj_codes: usize,
    pub loaded_at: DateTime<Utc>,
}

impl Datasets {
    pub fn from_bytes(pledgers: Bytes, dyj: Bytes) -> Result<Self, LoadError> {
        let store = parse_pledgers(&pledgers)?;
        let codes = parse_do_your_job_districts(&dyj)?;
        let summary = DatasetSummary::of(&store);
        if summary.unknown_states > 0 {
            warn!(
                unknown_states = summary.unknown_states,
                "pledger dataset has keys outside the state dictionary"
            );
        }
        Ok(Self {
            pledgers: CachedJson::new("pledgers", pledgers),
            do_your_job_districts: CachedJson::new("dyjd", dyj),
            summary,
            dyj_codes: codes.len(),
            loaded_at: Utc::now(),
        })
    }

    pub async fn load(dir: &Path) -> Result<Self, LoadError> {
        let pledgers = read(&dir.join(PLEDGERS_FILE)).await?;
        let dyj = read(&dir.join(DYJ_FILE)).await?;
        let datasets = Self::from_bytes(pledgers, dyj)?;
        info!(
            states = datasets.summary.states,
            records = datasets.summary.records,
            pledged = datasets.summary.pledged,
            dyj_codes = datasets.dyj_codes,
            "datasets loaded"
        );
        Ok(datasets)
    }
}

async fn read(path: &Path) -> Result<Bytes, LoadError> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|source| LoadError::Read {
            path: path.to_owned(),
            source,
        })
}

#[derive(Clone)]
pub struct AppState {
    pub datasets: Arc<Datasets>,
    pub data_dir: PathBuf,
    pub client_dist_dir: PathBuf,
}

impl AppState {
    pub fn new(datasets: Datasets, data_dir: PathBuf, client_dist_dir: PathBuf) -> Self {
        Self {
            datasets: Arc::new(datasets),
            data_dir,
            client_dist_dir,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const PLEDGERS: &str = r#"{
        "OH": [
            {"name":"A","state":"OH","district":3,"role":"Rep","status":"Nominee","pledged":true,"incumbent":false},
            {"name":"B","state":"OH","district":null,"role":"Senate","status":"Incumbent","pledged":false,"incumbent":true}
        ],
        "GU": [
            {"name":"C","state":"GU","district":0,"role":"Delegate","status":"Nominee","pledged":true,"incumbent":false}
        ]
    }"#;
    pub(crate) const DYJ: &str = r#"{"OH-3": true, "VT": true}"#;

    pub(crate) fn datasets() -> Datasets {
        Datasets::from_bytes(Bytes::from_static(PLEDGERS.as_bytes()), Bytes::from_static(DYJ.as_bytes()))
            .expect("fixture datasets")
    }

    #[test]
    fn summarises_and_tags_datasets() {
        let datasets = datasets();
        assert_eq!(datasets.summary.states, 2);
        assert_eq!(datasets.summary.records, 3);
        assert_eq!(datasets.summary.pledged, 2);
        assert_eq!(datasets.summary.unknown_states, 1);
        assert_eq!(datasets.dyj_codes, 2);
        assert!(datasets.pledgers.etag.starts_with("\"pledgers-"));
        assert_ne!(datasets.pledgers.etag, datasets.do_your_job_districts.etag);
        assert_eq!(datasets.pledgers.body, PLEDGERS.as_bytes());
    }

    #[test]
    fn etag_tracks_content() {
        let a = CachedJson::new("pledgers", Bytes::from_static(b"{}"));
        let b = CachedJson::new("pledgers", Bytes::from_static(b"{}"));
        let c = CachedJson::new("pledgers", Bytes::from_static(b"{\"OH\":[]}"));
        assert_eq!(a.etag, b.etag);
        assert_ne!(a.etag, c.etag);
    }

    #[test]
    fn rejects_misfiled_records() {
        let misfiled = r#"{"OH":[{"name":"A","state":"TX","role":"Rep","status":"Nominee"}]}"#;
        let err = Datasets::from_bytes(Bytes::from_static(misfiled.as_bytes()), Bytes::from_static(b"{}"))
            .expect_err("state mismatch");
        assert!(matches!(
            err,
            LoadError::Dataset(DatasetError::StateMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn loads_from_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join(PLEDGERS_FILE), PLEDGERS)
            .await
            .expect("write pledgers");
        tokio::fs::write(dir.path().join(DYJ_FILE), DYJ)
            .await
            .expect("write dyjd");

        let datasets = Datasets::load(dir.path()).await.expect("load");
        assert_eq!(datasets.summary.records, 3);
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Datasets::load(dir.path()).await.expect_err("missing files");
        assert!(matches!(err, LoadError::Read { .. }));
        assert!(err.to_string().contains(PLEDGERS_FILE));
    }
}
