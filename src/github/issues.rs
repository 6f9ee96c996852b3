//! Create-or-comment issue posting.
//!
//! A repository gets exactly one status issue per title: if an open
//! issue with the configured title *and* author already exists, the new
//! message lands as a comment on it; otherwise a fresh issue is opened.
//! Only the first page of 100 open issues is searched, which is plenty
//! for submission repositories.
//!
//! Unlike discovery, these calls are not rate-limit-retried: any
//! non-success status here aborts the whole notifier run.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::client::{GitHubClient, GitHubError};

#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Api(#[from] GitHubError),

    #[error("unexpected GitHub response: {0}")]
    Decode(#[from] reqwest::Error),

    #[error("failed to list issues for {repo}: {status}: {body}")]
    List {
        repo: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to comment on issue {url}: {status}: {body}")]
    Comment {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to create issue in {repo}: {status}: {body}")]
    Create {
        repo: String,
        status: StatusCode,
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, IssueError>;

#[derive(Debug, Deserialize)]
struct Issue {
    title: String,
    user: IssueAuthor,
    comments_url: String,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct IssueAuthor {
    login: String,
}

/// What `post_or_comment` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueAction {
    Commented { issue_url: String },
    Created { issue_url: String },
}

/// Posts `body` under the repository's status issue, creating the issue
/// if no open one with this `title` by `author` exists yet.
pub async fn post_or_comment(
    client: &GitHubClient,
    repo: &str,
    title: &str,
    body: &str,
    author: &str,
) -> Result<IssueAction> {
    let issues_path = format!("repos/{repo}/issues");
    let response = client
        .get_once(
            &issues_path,
            &[
                ("state", "open".to_string()),
                ("per_page", "100".to_string()),
            ],
        )
        .await?;
    if response.status() != StatusCode::OK {
        return Err(IssueError::List {
            repo: repo.to_string(),
            status: response.status(),
            body: response.text().await.unwrap_or_default(),
        });
    }
    let issues: Vec<Issue> = response.json().await?;

    if let Some(issue) = issues
        .iter()
        .find(|issue| issue.title == title && issue.user.login == author)
    {
        let response = client
            .post(&issue.comments_url, &json!({ "body": body }))
            .await?;
        if response.status() != StatusCode::CREATED {
            return Err(IssueError::Comment {
                url: issue.comments_url.clone(),
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        return Ok(IssueAction::Commented {
            issue_url: issue.html_url.clone(),
        });
    }

    let response = client
        .post(&issues_path, &json!({ "title": title, "body": body }))
        .await?;
    if response.status() != StatusCode::CREATED {
        return Err(IssueError::Create {
            repo: repo.to_string(),
            status: response.status(),
            body: response.text().await.unwrap_or_default(),
        });
    }
    let created: Issue = response.json().await?;
    Ok(IssueAction::Created {
        issue_url: created.html_url,
    })
}
