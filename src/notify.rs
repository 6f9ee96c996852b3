//! Build-status notification.
//!
//! Walks `build_logs.json` and posts one message per record to the
//! submission repository's status issue: congratulations when the build
//! succeeded, the simplified build log when it failed. Records with
//! neither outcome field are skipped. A fixed pause follows every post
//! to stay under GitHub's abuse-rate limits; the whole run aborts on the
//! first failed post.

use thiserror::Error;
use tracing::{debug, info};

use crate::build::{read_build_logs, BuildError};
use crate::config::Config;
use crate::github::issues::{post_or_comment, IssueError};
use crate::github::GitHubClient;
use crate::types::BuildRecord;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Reading `build_logs.json` failed.
    #[error(transparent)]
    BuildLogs(#[from] BuildError),

    #[error(transparent)]
    Issue(#[from] IssueError),
}

pub type Result<T> = std::result::Result<T, NotifyError>;

/// Composes the status message for one build record, or `None` when the
/// record carries neither an `image_id` nor build logs.
pub fn message_for(config: &Config, record: &BuildRecord) -> Option<String> {
    let user = record.user().unwrap_or(&record.repo);
    let commit = &record.commit;
    let deadline = &config.freeze_deadline;

    if record.image_id.is_some() {
        Some(format!(
            "Hi again @{user}.\n\n\
             This is an update on build status of your submission. \
             As of commit `{commit}`, it builds successfully. Good job 👍.\n\n\
             This is a last call to make any changes to your submission. \
             Any changes made after `{deadline}` will be ignored.\n\n\
             Good luck!"
        ))
    } else if let Some(logs) = &record.logs {
        Some(format!(
            "Hi again @{user}.\n\n\
             This is an update on build status of your submission. \
             As of commit `{commit}`, it fails to build. Simplified build log:\n\n\
             ```\n{logs}```\n\n\
             This is a last call to fix your submission or make any other \
             changes to it. Any changes made after `{deadline}` will be \
             ignored.\n\n\
             Good luck!"
        ))
    } else {
        None
    }
}

/// Runs the whole notification step. Returns the number of posts made.
pub async fn run(config: &Config, client: &GitHubClient) -> Result<usize> {
    let records = read_build_logs(&config.build_logs)?;
    info!(total = records.len(), "posting build-status notifications");

    let mut posted = 0;
    for record in &records {
        let Some(body) = message_for(config, record) else {
            debug!(repo = %record.repo, "record has no build outcome, skipping");
            continue;
        };
        let action = post_or_comment(
            client,
            &record.repo,
            &config.issue_title,
            &body,
            &config.issue_author,
        )
        .await?;
        info!(repo = %record.repo, ?action, "notified");
        posted += 1;
        tokio::time::sleep(config.notify_pause).await;
    }
    info!(posted, "notification pass finished");
    Ok(posted)
}
