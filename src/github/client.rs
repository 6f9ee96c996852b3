//! Rate-limited GitHub API client.
//!
//! GitHub signals primary-rate-limit exhaustion with a 403 whose
//! `X-RateLimit-Remaining` header is 0; `X-RateLimit-Reset` then carries
//! the unix time at which the quota refills. [`GitHubClient::get`] sleeps
//! until that reset and re-issues the identical request, with no retry
//! ceiling: an endpoint that never recovers blocks forever.
//!
//! A 403 whose remaining count is *not* zero is retried immediately.
//! That leniency is deliberate and load-bearing: secondary/abuse limits
//! also answer 403, and operators rely on the loop riding them out.
//!
//! Any non-403 response is returned as-is, whatever its status. Callers
//! that care about 404 (branch lookups) check it themselves.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Errors from talking to the GitHub API.
///
/// Only transport-level failures surface here; HTTP error statuses are
/// data, not errors, at this layer.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// A GitHub API client bound to a base URL and optional bearer token.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Creates a client for the given base URL. `token` of `None` means
    /// unauthenticated requests.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(GitHubClient {
            http,
            base_url: base_url.into(),
            token,
        })
    }

    /// Creates a client from the configuration's API base and token.
    pub fn from_config(config: &Config) -> Result<Self> {
        GitHubClient::new(&config.github_api_base, config.auth_token.clone())
    }

    /// Joins a path onto the base URL. Absolute URLs (as returned by the
    /// API itself, e.g. `comments_url`) pass through untouched.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        }
    }

    /// GET with rate-limit handling: loops on 403, sleeping until the
    /// advertised reset when the quota is exhausted. Returns the first
    /// non-403 response regardless of its status.
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Response> {
        let url = self.url(path);
        loop {
            let response = self.get_once_url(&url, params).await?;
            if response.status() != StatusCode::FORBIDDEN {
                return Ok(response);
            }
            self.wait_for_reset(response.headers()).await;
        }
    }

    /// Single GET without rate-limit retries. The notifier uses this:
    /// any non-success status there is fatal rather than retried.
    pub async fn get_once(&self, path: &str, params: &[(&str, String)]) -> Result<Response> {
        self.get_once_url(&self.url(path), params).await
    }

    async fn get_once_url(&self, url: &str, params: &[(&str, String)]) -> Result<Response> {
        let mut request = self.http.get(url).header(ACCEPT, GITHUB_ACCEPT).query(params);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Single POST of a JSON body. `path` may be relative to the base
    /// URL or an absolute URL handed out by the API.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Response> {
        let mut request = self
            .http
            .post(self.url(path))
            .header(ACCEPT, GITHUB_ACCEPT)
            .json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Sleeps until the rate-limit reset if the 403 actually reports an
    /// exhausted quota; otherwise returns immediately so the caller
    /// retries right away.
    async fn wait_for_reset(&self, headers: &HeaderMap) {
        // An absent or unparsable remaining-count header is treated as
        // "not exhausted", matching the immediate-retry path.
        if header_u64(headers, "x-ratelimit-remaining") != Some(0) {
            debug!("403 without exhausted quota, retrying immediately");
            return;
        }
        let now = Utc::now().timestamp();
        let reset = header_u64(headers, "x-ratelimit-reset")
            .map(|r| r as i64)
            .unwrap_or(now);
        let sleep_secs = (reset - now).max(0) as u64;
        info!(sleep_secs, "rate limit exhausted, sleeping until reset");
        tokio::time::sleep(Duration::from_secs(sleep_secs)).await;
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}
