//! Process-wide configuration.
//!
//! Every knob that was a hardcoded constant in the original operator
//! scripts (endpoint URLs, concurrency caps, file paths, pauses) is an
//! explicit field here so tests can substitute mock endpoints and small
//! caps. Binaries start from [`Config::from_env`] and tweak nothing.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the GitHub bearer token.
///
/// Absence is not an error: requests go out unauthenticated (and will
/// most likely be rejected by the API, which surfaces as ordinary HTTP
/// failures downstream).
pub const GIT_AUTH_TOKEN_VAR: &str = "GIT_AUTH_TOKEN";

/// Configuration for all tournament workflows.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the GitHub REST API.
    pub github_api_base: String,

    /// Organization holding the submission repositories.
    pub org: String,

    /// Name prefix identifying submission repositories within the org.
    pub repo_prefix: String,

    /// Branch that must exist for a repository to enter the tournament.
    pub tournament_branch: String,

    /// Title of the status issue created (or commented on) per repository.
    pub issue_title: String,

    /// Login of the account posting status issues. Used to find an
    /// existing issue to comment on instead of opening a duplicate.
    pub issue_author: String,

    /// Deadline quoted in status messages after which changes are ignored.
    pub freeze_deadline: String,

    /// Bearer token for the GitHub API, if any.
    pub auth_token: Option<String>,

    /// Build service endpoint (full URL).
    pub build_endpoint: String,

    /// Match service endpoint (full URL).
    pub match_endpoint: String,

    /// Hard cap on simultaneously in-flight build requests.
    pub build_concurrency: usize,

    /// Hard cap on simultaneously in-flight match requests.
    pub match_concurrency: usize,

    /// Per-request timeout for build requests.
    pub build_timeout: Duration,

    /// Per-request timeout for match requests. Matches can legitimately
    /// run for a very long time, so the default is effectively unbounded.
    pub match_timeout: Duration,

    /// Pause after every issue post, to stay under abuse-rate limits.
    pub notify_pause: Duration,

    /// Input/output of the discovery and build steps.
    pub repos_csv: PathBuf,

    /// Output of the build step; input to matching and notification.
    pub build_logs: PathBuf,

    /// Append-only newline-delimited JSON log of completed matches.
    pub match_results: PathBuf,
}

impl Config {
    /// Creates a configuration with the production defaults.
    pub fn new() -> Self {
        Config {
            github_api_base: "https://api.github.com".to_string(),
            org: "is-itmo-c-24".to_string(),
            repo_prefix: "labwork5-".to_string(),
            tournament_branch: "tournament".to_string(),
            issue_title: "Battleship tournament".to_string(),
            issue_author: "mrsobakin".to_string(),
            freeze_deadline: "23:59:59 MSK".to_string(),
            auth_token: None,
            build_endpoint: "http://localhost:4239/build".to_string(),
            match_endpoint: "http://localhost:4239/run_match".to_string(),
            build_concurrency: 4,
            match_concurrency: 75,
            build_timeout: Duration::from_secs(180),
            match_timeout: Duration::from_secs(100_000),
            notify_pause: Duration::from_secs(7),
            repos_csv: PathBuf::from("repos.csv"),
            build_logs: PathBuf::from("build_logs.json"),
            match_results: PathBuf::from("match_results.json"),
        }
    }

    /// Creates the default configuration with the auth token picked up
    /// from the environment.
    pub fn from_env() -> Self {
        Config::new().with_auth_token(std::env::var(GIT_AUTH_TOKEN_VAR).ok())
    }

    /// Sets the GitHub bearer token.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    /// Sets the GitHub API base URL (mock servers in tests).
    pub fn with_github_api_base(mut self, base: impl Into<String>) -> Self {
        self.github_api_base = base.into();
        self
    }

    /// Sets the organization holding the submission repositories.
    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }

    /// Sets the build service endpoint.
    pub fn with_build_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.build_endpoint = endpoint.into();
        self
    }

    /// Sets the match service endpoint.
    pub fn with_match_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.match_endpoint = endpoint.into();
        self
    }

    /// Sets the pause between issue posts.
    pub fn with_notify_pause(mut self, pause: Duration) -> Self {
        self.notify_pause = pause;
        self
    }

    /// Redirects all file paths into the given directory. Used by tests
    /// and by operators running several tournaments side by side.
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.repos_csv = dir.join("repos.csv");
        self.build_logs = dir.join("build_logs.json");
        self.match_results = dir.join("match_results.json");
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}
