//! Domain types shared across the tournament workflows.
//!
//! Result records deliberately keep whatever extra fields the external
//! services return (via flattened maps): the services own their response
//! schemas, and the logs must survive schema additions on their side.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a successfully built submission image.
///
/// Opaque string minted by the build service; used as input to match
/// requests and as the key of the completed-pair set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl ImageId {
    pub fn new(s: impl Into<String>) -> Self {
        ImageId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        ImageId(s.to_string())
    }
}

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        ImageId(s)
    }
}

/// One row of `repos.csv`: a repository pinned to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// Full repository name, `owner/repo`.
    pub repo: String,

    /// Commit SHA of the tournament branch at discovery time.
    #[serde(rename = "ref")]
    pub commit: String,
}

impl RepoRef {
    pub fn new(repo: impl Into<String>, commit: impl Into<String>) -> Self {
        RepoRef {
            repo: repo.into(),
            commit: commit.into(),
        }
    }
}

/// Outcome of one build request: the service's JSON body merged with the
/// identifying `repo`/`ref` fields of the originating work unit.
///
/// `image_id` present means the build succeeded; `logs` carries the
/// simplified build log on failure. Neither is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub repo: String,

    #[serde(rename = "ref")]
    pub commit: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<ImageId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,

    /// Whatever else the build service returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BuildRecord {
    /// Merges a build-service response body with the originating work
    /// unit. The identifying fields win over any `repo`/`ref` keys the
    /// service might echo back.
    pub fn from_response(unit: RepoRef, body: Value) -> Self {
        let mut extra = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        extra.remove("repo");
        extra.remove("ref");
        let image_id = match extra.remove("image_id") {
            Some(Value::String(s)) => Some(ImageId(s)),
            _ => None,
        };
        let logs = match extra.remove("logs") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        BuildRecord {
            repo: unit.repo,
            commit: unit.commit,
            image_id,
            logs,
            extra,
        }
    }

    /// The student's login, derived from the repository name: everything
    /// after the first `-` in the part after `owner/`.
    ///
    /// `org/labwork5-alice` yields `alice`. Returns `None` for names that
    /// don't follow the submission naming scheme.
    pub fn user(&self) -> Option<&str> {
        let (_, name) = self.repo.split_once('/')?;
        let (_, user) = name.split_once('-')?;
        Some(user)
    }
}

/// Outcome of one match: the service's JSON body merged with the pair of
/// image ids that played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub master_image_id: ImageId,
    pub slave_image_id: ImageId,

    /// Whatever else the match service returned (winner, turns, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MatchRecord {
    /// Merges a match-service response body with the originating pair.
    /// The identifying fields win over any echoed-back keys.
    pub fn from_response(master: ImageId, slave: ImageId, body: Value) -> Self {
        let mut extra = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        extra.remove("master_image_id");
        extra.remove("slave_image_id");
        MatchRecord {
            master_image_id: master,
            slave_image_id: slave,
            extra,
        }
    }

    /// The (master, slave) pair this record completes.
    pub fn pair(&self) -> (ImageId, ImageId) {
        (self.master_image_id.clone(), self.slave_image_id.clone())
    }
}
