//! Submission-repository discovery.
//!
//! Walks the organization's repository list page by page, keeps the
//! repositories whose name carries the submission prefix, and resolves
//! each one's tournament branch to a commit SHA. Repositories without
//! the branch simply never entered the tournament and are skipped.

use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::types::RepoRef;

use super::client::{GitHubClient, GitHubError};

const PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Api(#[from] GitHubError),

    /// Unexpected response shape; also covers error bodies returned with
    /// a non-404 status, which fail to parse as the expected schema.
    #[error("unexpected GitHub response: {0}")]
    Decode(#[from] reqwest::Error),

    #[error("failed to write {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[derive(Debug, Deserialize)]
struct RepoSummary {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
struct BranchCommit {
    sha: String,
}

/// Lists every repository name in the organization. Pagination ends at
/// the first empty page.
pub async fn org_repos(client: &GitHubClient, org: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for page in 1u32.. {
        debug!(org, page, "fetching repository page");
        let response = client
            .get(
                &format!("orgs/{org}/repos"),
                &[
                    ("per_page", PAGE_SIZE.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;
        let batch: Vec<RepoSummary> = response.json().await?;
        if batch.is_empty() {
            break;
        }
        names.extend(batch.into_iter().map(|repo| repo.name));
    }
    Ok(names)
}

/// Resolves a branch to its head commit SHA. A 404 means the branch (or
/// repository) does not exist and is a normal absence, not an error.
pub async fn branch_sha(
    client: &GitHubClient,
    org: &str,
    repo: &str,
    branch: &str,
) -> Result<Option<String>> {
    let response = client
        .get(&format!("repos/{org}/{repo}/branches/{branch}"), &[])
        .await?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let branch: BranchResponse = response.json().await?;
    Ok(Some(branch.commit.sha))
}

/// Discovers all tournament entries: prefixed repositories whose
/// tournament branch exists, pinned to that branch's head commit.
pub async fn discover(client: &GitHubClient, config: &Config) -> Result<Vec<RepoRef>> {
    let names = org_repos(client, &config.org).await?;
    info!(total = names.len(), "listed organization repositories");

    let mut entries = Vec::new();
    for name in names
        .iter()
        .filter(|name| name.starts_with(&config.repo_prefix))
    {
        match branch_sha(client, &config.org, name, &config.tournament_branch).await? {
            Some(sha) => {
                debug!(repo = %name, sha = %sha, "tournament branch found");
                entries.push(RepoRef::new(format!("{}/{}", config.org, name), sha));
            }
            None => debug!(repo = %name, "no tournament branch, skipping"),
        }
    }
    info!(entries = entries.len(), "discovery finished");
    Ok(entries)
}

/// Writes discovered entries as `repos.csv` (columns `repo,ref`).
pub fn write_repos_csv(path: &Path, entries: &[RepoRef]) -> Result<()> {
    let csv_err = |source| DiscoveryError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    // Header goes out even for an empty discovery, like the rest of the
    // pipeline expects.
    writer.write_record(["repo", "ref"]).map_err(csv_err)?;
    for entry in entries {
        writer
            .write_record([entry.repo.as_str(), entry.commit.as_str()])
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| DiscoveryError::Csv {
        path: path.to_path_buf(),
        source: source.into(),
    })?;
    Ok(())
}
