//! Mock GitHub API servers: a scripted rate limiter, an org listing with
//! branch lookups, and an issue tracker that records posts.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

// ─── Rate-limit server ───────────────────────────────────────────────────────

/// What the first response should look like; every later request gets a
/// plain 200 with an empty JSON array.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitScript {
    pub first_status: u16,
    pub remaining: u64,
    pub reset: i64,
}

struct RateLimitState {
    script: RateLimitScript,
    hits: AtomicUsize,
}

pub struct RateLimitServer {
    addr: SocketAddr,
    state: Arc<RateLimitState>,
}

impl RateLimitServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

pub async fn rate_limit_server(script: RateLimitScript) -> RateLimitServer {
    let state = Arc::new(RateLimitState {
        script,
        hits: AtomicUsize::new(0),
    });
    let app = Router::new()
        .fallback(rate_limit_handler)
        .with_state(Arc::clone(&state));
    let addr = super::spawn(app).await;
    RateLimitServer { addr, state }
}

async fn rate_limit_handler(State(state): State<Arc<RateLimitState>>) -> Response {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    if hit == 1 {
        Response::builder()
            .status(state.script.first_status)
            .header("x-ratelimit-remaining", state.script.remaining.to_string())
            .header("x-ratelimit-reset", state.script.reset.to_string())
            .body(Body::from("scripted response"))
            .unwrap()
    } else {
        Json(json!([])).into_response()
    }
}

// ─── Organization server ─────────────────────────────────────────────────────

struct OrgState {
    pages: Vec<Vec<String>>,
    hits: AtomicUsize,
    branches: Mutex<HashMap<(String, String), String>>,
}

pub struct OrgServer {
    addr: SocketAddr,
    state: Arc<OrgState>,
}

impl OrgServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Repo-listing requests served so far (branch lookups not counted).
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Registers a branch; unregistered branches answer 404.
    pub fn set_branch(&self, repo: &str, branch: &str, sha: &str) {
        self.state
            .branches
            .lock()
            .unwrap()
            .insert((repo.to_string(), branch.to_string()), sha.to_string());
    }
}

/// Serves the given repo-name pages for any organization; pages past the
/// end are empty, which is how real pagination terminates.
pub async fn org_server(_org: &str, pages: Vec<Vec<&str>>) -> OrgServer {
    let state = Arc::new(OrgState {
        pages: pages
            .into_iter()
            .map(|page| page.into_iter().map(String::from).collect())
            .collect(),
        hits: AtomicUsize::new(0),
        branches: Mutex::new(HashMap::new()),
    });
    let app = Router::new()
        .route("/orgs/{org}/repos", get(org_repos_handler))
        .route(
            "/repos/{org}/{repo}/branches/{branch}",
            get(branch_handler),
        )
        .with_state(Arc::clone(&state));
    let addr = super::spawn(app).await;
    OrgServer { addr, state }
}

async fn org_repos_handler(
    State(state): State<Arc<OrgState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let page: usize = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let names = state
        .pages
        .get(page.saturating_sub(1))
        .cloned()
        .unwrap_or_default();
    Json(json!(names
        .iter()
        .map(|name| json!({ "name": name }))
        .collect::<Vec<_>>()))
}

async fn branch_handler(
    State(state): State<Arc<OrgState>>,
    Path((_org, repo, branch)): Path<(String, String, String)>,
) -> Response {
    match state.branches.lock().unwrap().get(&(repo, branch)) {
        Some(sha) => Json(json!({ "commit": { "sha": sha } })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Not Found" })),
        )
            .into_response(),
    }
}

// ─── Issue server ────────────────────────────────────────────────────────────

struct SeededIssue {
    repo: String,
    title: String,
    author: String,
    number: usize,
}

struct IssueState {
    base_url: String,
    issues: Mutex<Vec<SeededIssue>>,
    comments: Mutex<Vec<String>>,
    created: Mutex<Vec<(String, String)>>,
    fail_listing: AtomicBool,
}

pub struct IssueServer {
    addr: SocketAddr,
    state: Arc<IssueState>,
}

impl IssueServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Seeds an existing open issue on `repo` (`owner/repo`).
    pub fn seed_issue(&self, repo: &str, title: &str, author: &str) {
        let mut issues = self.state.issues.lock().unwrap();
        let number = issues.len() + 1;
        issues.push(SeededIssue {
            repo: repo.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            number,
        });
    }

    /// Comment bodies received so far, in arrival order.
    pub fn comments(&self) -> Vec<String> {
        self.state.comments.lock().unwrap().clone()
    }

    /// `(title, body)` of issues created so far, in arrival order.
    pub fn created_issues(&self) -> Vec<(String, String)> {
        self.state.created.lock().unwrap().clone()
    }

    /// Makes the issue-listing endpoint answer 500 from now on.
    pub fn fail_listing(&self) {
        self.state.fail_listing.store(true, Ordering::SeqCst);
    }
}

pub async fn issue_server() -> IssueServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let state = Arc::new(IssueState {
        base_url: format!("http://{addr}"),
        issues: Mutex::new(Vec::new()),
        comments: Mutex::new(Vec::new()),
        created: Mutex::new(Vec::new()),
        fail_listing: AtomicBool::new(false),
    });
    let app = Router::new()
        .route(
            "/repos/{owner}/{repo}/issues",
            get(list_issues_handler).post(create_issue_handler),
        )
        .route("/comments/{number}", post(comment_handler))
        .with_state(Arc::clone(&state));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    IssueServer { addr, state }
}

fn issue_json(state: &IssueState, number: usize, title: &str, author: &str) -> Value {
    json!({
        "title": title,
        "user": { "login": author },
        "comments_url": format!("{}/comments/{number}", state.base_url),
        "html_url": format!("{}/issues/{number}", state.base_url),
    })
}

async fn list_issues_handler(
    State(state): State<Arc<IssueState>>,
    Path((owner, repo)): Path<(String, String)>,
) -> Response {
    if state.fail_listing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "listing disabled").into_response();
    }
    let full_name = format!("{owner}/{repo}");
    let issues: Vec<Value> = state
        .issues
        .lock()
        .unwrap()
        .iter()
        .filter(|issue| issue.repo == full_name)
        .map(|issue| issue_json(&state, issue.number, &issue.title, &issue.author))
        .collect();
    Json(json!(issues)).into_response()
}

async fn comment_handler(
    State(state): State<Arc<IssueState>>,
    Json(body): Json<Value>,
) -> Response {
    let text = body["body"].as_str().unwrap_or_default().to_string();
    state.comments.lock().unwrap().push(text);
    (StatusCode::CREATED, Json(json!({}))).into_response()
}

async fn create_issue_handler(
    State(state): State<Arc<IssueState>>,
    Json(body): Json<Value>,
) -> Response {
    let title = body["title"].as_str().unwrap_or_default().to_string();
    let text = body["body"].as_str().unwrap_or_default().to_string();
    let number = 1000 + state.created.lock().unwrap().len();
    state.created.lock().unwrap().push((title.clone(), text));
    (
        StatusCode::CREATED,
        Json(issue_json(&state, number, &title, "mock-bot")),
    )
        .into_response()
}
