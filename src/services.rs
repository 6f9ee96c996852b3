//! Thin clients for the build and match services.
//!
//! Both services are opaque HTTP endpoints: POST a JSON body, get a JSON
//! body back. The HTTP status is deliberately not inspected — whatever
//! JSON the service returns is recorded as the outcome, and only
//! transport failures or non-JSON bodies abort a batch. That mirrors how
//! the operators actually run these services: a failed build is still a
//! perfectly good result record.

use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::types::{BuildRecord, ImageId, MatchRecord, RepoRef};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to construct http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned a non-JSON body: {source}")]
    Body {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

pub type Result<T> = std::result::Result<T, ServiceError>;

async fn post_json(http: &reqwest::Client, endpoint: &str, body: Value) -> Result<Value> {
    let response = http
        .post(endpoint)
        .json(&body)
        .send()
        .await
        .map_err(|source| ServiceError::Http {
            endpoint: endpoint.to_string(),
            source,
        })?;
    response.json().await.map_err(|source| ServiceError::Body {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Client for the build service.
#[derive(Debug, Clone)]
pub struct BuildClient {
    http: reqwest::Client,
    endpoint: String,
}

impl BuildClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ServiceError::Client)?;
        Ok(BuildClient {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        BuildClient::new(&config.build_endpoint, config.build_timeout)
    }

    /// Submits one build request and merges the response with the
    /// originating repo/ref.
    pub async fn build(&self, unit: &RepoRef) -> Result<BuildRecord> {
        debug!(repo = %unit.repo, "submitting build");
        let body = post_json(
            &self.http,
            &self.endpoint,
            json!({ "repo": unit.repo, "ref": unit.commit }),
        )
        .await?;
        Ok(BuildRecord::from_response(unit.clone(), body))
    }
}

/// Client for the match service.
#[derive(Debug, Clone)]
pub struct MatchClient {
    http: reqwest::Client,
    endpoint: String,
}

impl MatchClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ServiceError::Client)?;
        Ok(MatchClient {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        MatchClient::new(&config.match_endpoint, config.match_timeout)
    }

    /// Runs one match and merges the response with the pair that played.
    pub async fn run_match(&self, master: &ImageId, slave: &ImageId) -> Result<MatchRecord> {
        debug!(master = %master, slave = %slave, "submitting match");
        let body = post_json(
            &self.http,
            &self.endpoint,
            json!({
                "master_image_id": master,
                "slave_image_id": slave,
            }),
        )
        .await?;
        Ok(MatchRecord::from_response(master.clone(), slave.clone(), body))
    }
}
