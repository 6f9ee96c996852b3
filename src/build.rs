//! Build fan-out: submit every `repos.csv` row to the build service.
//!
//! Deliberately not resumable: builds are cheap relative to matches and
//! rerunning resubmits every row, so a fresh `build_logs.json` always
//! reflects one coherent pass. Results accumulate in memory and are
//! written once at the end, so no mid-run shared state exists.

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::dispatch::dispatch;
use crate::services::{BuildClient, ServiceError};
use crate::types::{BuildRecord, RepoRef};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type Result<T> = std::result::Result<T, BuildError>;

/// Reads the `repo,ref` rows of a discovery CSV.
pub fn read_repos(path: &Path) -> Result<Vec<RepoRef>> {
    let csv_err = |source| BuildError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<RepoRef>, csv::Error>>()
        .map_err(csv_err)
}

/// Writes the collected build records as one JSON array.
pub fn write_build_logs(path: &Path, records: &[BuildRecord]) -> Result<()> {
    let file = File::create(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer(file, records).map_err(|source| BuildError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a build-log array back. Input to matching, notification and
/// export.
pub fn read_build_logs(path: &Path) -> Result<Vec<BuildRecord>> {
    let file = File::open(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(file).map_err(|source| BuildError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs the whole build step: read `repos.csv`, fan out at the build
/// cap, write `build_logs.json`. Returns the collected records.
pub async fn run(config: &Config) -> Result<Vec<BuildRecord>> {
    let units = read_repos(&config.repos_csv)?;
    info!(total = units.len(), "submitting build requests");

    let client = BuildClient::from_config(config)?;
    let records = dispatch(units, config.build_concurrency, move |unit: RepoRef| {
        let client = client.clone();
        async move { client.build(&unit).await }
    })
    .await?;

    let built = records.iter().filter(|r| r.image_id.is_some()).count();
    info!(
        total = records.len(),
        built,
        failed = records.len() - built,
        "build pass finished"
    );
    write_build_logs(&config.build_logs, &records)?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_service;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn build_pass_writes_merged_records() {
        let dir = tempdir().unwrap();
        let server = mock_service::json_server(json!({ "image_id": "img" })).await;
        let config = Config::new()
            .with_workdir(dir.path())
            .with_build_endpoint(server.endpoint());

        std::fs::write(
            &config.repos_csv,
            "repo,ref\norg/labwork5-a,sha-a\norg/labwork5-b,sha-b\n",
        )
        .unwrap();

        let records = run(&config).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.image_id.is_some()));

        // The file holds one JSON array with the identifying fields merged in.
        let written = read_build_logs(&config.build_logs).unwrap();
        assert_eq!(written, records);
        let repos: Vec<&str> = written.iter().map(|r| r.repo.as_str()).collect();
        assert!(repos.contains(&"org/labwork5-a"));
        assert!(repos.contains(&"org/labwork5-b"));
    }

    #[test]
    fn read_repos_rejects_malformed_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repos.csv");
        std::fs::write(&path, "repo,ref\nonly-one-column\n").unwrap();
        assert!(matches!(read_repos(&path), Err(BuildError::Csv { .. })));
    }

    #[test]
    fn build_logs_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("build_logs.json");
        let records = vec![BuildRecord::from_response(
            RepoRef::new("o/r", "c"),
            json!({ "image_id": "i", "took_ms": 12 }),
        )];
        write_build_logs(&path, &records).unwrap();
        assert_eq!(read_build_logs(&path).unwrap(), records);
    }
}
