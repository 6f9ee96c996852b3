//! GitHub REST API access: rate-limited fetching, repository discovery,
//! and issue posting.

pub mod client;
pub mod discovery;
pub mod issues;

pub use client::{GitHubClient, GitHubError};
