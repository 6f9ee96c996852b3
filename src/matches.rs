//! Match fan-out: run every pending pair against the match service.
//!
//! The resumable half of the tournament. Before dispatch, the result log
//! is replayed into the completed-pair set and those pairs are dropped
//! from the enumeration; each completion is appended to the log as it
//! arrives. Rerunning the entry point after a crash therefore picks up
//! exactly where the log left off, and no pair is played twice across
//! runs.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::build::{read_build_logs, BuildError};
use crate::config::Config;
use crate::dispatch::dispatch;
use crate::pairing::{self, Pair};
use crate::results::{load_completed, ResultLog, ResultLogError};
use crate::services::{MatchClient, ServiceError};

#[derive(Debug, Error)]
pub enum MatchError {
    /// Reading `build_logs.json` failed.
    #[error(transparent)]
    BuildLogs(#[from] BuildError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    ResultLog(#[from] ResultLogError),
}

pub type Result<T> = std::result::Result<T, MatchError>;

/// Runs the whole match step. Returns the number of matches played in
/// this invocation (completed pairs from prior runs are skipped).
pub async fn run(config: &Config) -> Result<usize> {
    let records = read_build_logs(&config.build_logs)?;
    let ids = pairing::image_ids(&records);
    let completed = load_completed(&config.match_results)?;
    let pending = pairing::pending_pairs(pairing::all_pairs(&ids), &completed);
    info!(
        images = ids.len(),
        completed = completed.len(),
        pending = pending.len(),
        "starting match dispatch"
    );

    let log = Arc::new(ResultLog::open(&config.match_results)?);
    let client = MatchClient::from_config(config)?;

    let played = dispatch(
        pending,
        config.match_concurrency,
        move |(master, slave): Pair| {
            let client = client.clone();
            let log = Arc::clone(&log);
            async move {
                let record = client.run_match(&master, &slave).await?;
                log.append(&record).await?;
                Ok::<(), MatchError>(())
            }
        },
    )
    .await?;

    info!(played = played.len(), "match pass finished");
    Ok(played.len())
}
