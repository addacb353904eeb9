//! In-memory fake of the Travis CI v2 API used by the client's integration
//! tests.
//!
//! One repository (`OWNER/REPO`) is seeded with three builds, newest first.
//! Every request is recorded as `"METHOD /path"` so tests can assert on the
//! exact sequence of calls a client made.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const OWNER: &str = "hansjorg";
pub const REPO: &str = "rustci-test-project";
pub const REPO_ID: u64 = 1;
/// GitHub token `POST /auth/github` accepts.
pub const GITHUB_TOKEN: &str = "github-oauth-token";
/// Travis token handed out for `GITHUB_TOKEN` and required by `POST /requests`.
pub const ACCESS_TOKEN: &str = "travis-access-token";
pub const PUBLIC_KEY_PEM: &str = include_str!("../../test-vectors/keys/repo_key.pub.pem");
pub const KEY_FINGERPRINT: &str = "3d:6f:2e:0a:9b:41:c7:55:18:e2:7d:90:aa:04:6c:b1";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Build {
    pub id: u64,
    pub repository_id: u64,
    pub number: String,
    pub state: String,
    pub branch: String,
    pub commit: String,
    pub message: String,
    pub event_type: String,
    pub job_ids: Vec<u64>,
}

#[derive(Deserialize)]
pub struct AuthRequest {
    pub github_token: String,
}

#[derive(Deserialize)]
pub struct RestartRequest {
    pub build_id: u64,
}

#[derive(Clone)]
pub struct MockState {
    builds: Arc<RwLock<Vec<Build>>>,
    hits: Arc<Mutex<Vec<String>>>,
}

impl MockState {
    pub fn new() -> Self {
        Self {
            builds: Arc::new(RwLock::new(seed_builds())),
            hits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Requests received so far, as `"METHOD /path"`.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().map(|hits| hits.clone()).unwrap_or_default()
    }

    /// Current state of a build. Must not be called from inside the runtime.
    pub fn build_state(&self, id: u64) -> Option<String> {
        self.builds
            .blocking_read()
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.state.clone())
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_builds() -> Vec<Build> {
    let build = |id: u64, number: &str, state: &str, branch: &str, sha: &str, message: &str| Build {
        id,
        repository_id: REPO_ID,
        number: number.to_string(),
        state: state.to_string(),
        branch: branch.to_string(),
        commit: sha.to_string(),
        message: message.to_string(),
        event_type: "push".to_string(),
        job_ids: vec![job_id(id)],
    };
    vec![
        build(203, "3", "failed", "master", "c3d4e5f", "Bump dependencies"),
        build(202, "2", "passed", "develop", "b2c3d4e", "Try nightly"),
        build(201, "1", "passed", "master", "a1b2c3d", "Initial commit"),
    ]
}

/// Each seeded build has a single job; its log shares the job's id.
fn job_id(build_id: u64) -> u64 {
    build_id * 10 + 1
}

pub fn app() -> Router {
    app_with_state(MockState::new())
}

pub fn app_with_state(state: MockState) -> Router {
    Router::new()
        .route("/auth/github", post(auth_github))
        .route("/requests", post(restart_build))
        .route("/repos/{owner}/{repo}", get(get_repo))
        .route("/repos/{owner}/{repo}/builds", get(list_builds))
        .route("/repos/{owner}/{repo}/branches/{branch}", get(get_branch))
        .route("/repos/{owner}/{repo}/key", get(get_key))
        .route("/builds/{id}", get(get_build))
        .route("/logs/{id}", get(get_log))
        .route("/uptime/", get(uptime))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, MockState::new()).await
}

pub async fn run_with_state(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn record(State(state): State<MockState>, request: Request, next: Next) -> Response {
    if let Ok(mut hits) = state.hits.lock() {
        hits.push(format!("{} {}", request.method(), request.uri().path()));
    }
    next.run(request).await
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "file": "not found" })))
}

fn known_repo(owner: &str, repo: &str) -> Result<(), (StatusCode, Json<Value>)> {
    if owner == OWNER && repo == REPO {
        Ok(())
    } else {
        Err(not_found())
    }
}

fn commit_json(build: &Build) -> Value {
    json!({
        "id": build.id + 1000,
        "sha": build.commit,
        "branch": build.branch,
        "message": build.message,
        "author_name": "Hans",
        "author_email": "hans@example.com",
    })
}

/// Detail-endpoint shape: the commit is referenced by `commit_id`.
fn build_detail_json(build: &Build) -> Value {
    json!({
        "id": build.id,
        "repository_id": build.repository_id,
        "commit_id": build.id + 1000,
        "number": build.number,
        "state": build.state,
        "pull_request": false,
        "job_ids": build.job_ids,
    })
}

async fn auth_github(Json(input): Json<AuthRequest>) -> Result<Json<Value>, (StatusCode, String)> {
    if input.github_token == GITHUB_TOKEN {
        Ok(Json(json!({ "access_token": ACCESS_TOKEN })))
    } else {
        Err((StatusCode::FORBIDDEN, "not a Travis user".to_string()))
    }
}

async fn restart_build(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(input): Json<RestartRequest>,
) -> Result<Json<Value>, StatusCode> {
    let expected = format!("token {ACCESS_TOKEN}");
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return Err(StatusCode::FORBIDDEN);
    }

    let mut builds = state.builds.write().await;
    match builds.iter_mut().find(|b| b.id == input.build_id) {
        Some(build) => {
            build.state = "created".to_string();
            Ok(Json(json!({
                "result": true,
                "flash": [{ "notice": "The build was successfully restarted." }],
            })))
        }
        None => Ok(Json(json!({
            "result": false,
            "flash": [{ "error": "The build could not be restarted." }],
        }))),
    }
}

async fn get_repo(
    State(state): State<MockState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    known_repo(&owner, &repo)?;
    let builds = state.builds.read().await;
    let last = builds.first();
    Ok(Json(json!({
        "repo": {
            "id": REPO_ID,
            "slug": format!("{OWNER}/{REPO}"),
            "description": "Test project for rust-ci",
            "active": true,
            "github_language": "Rust",
            "last_build_id": last.map(|b| b.id),
            "last_build_number": last.map(|b| b.number.clone()),
            "last_build_state": last.map(|b| b.state.clone()),
        }
    })))
}

async fn list_builds(
    State(state): State<MockState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<Vec<Build>>, (StatusCode, Json<Value>)> {
    known_repo(&owner, &repo)?;
    Ok(Json(state.builds.read().await.clone()))
}

async fn get_branch(
    State(state): State<MockState>,
    Path((owner, repo, branch)): Path<(String, String, String)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    known_repo(&owner, &repo)?;
    let builds = state.builds.read().await;
    let build = builds.iter().find(|b| b.branch == branch).ok_or_else(not_found)?;
    Ok(Json(json!({
        "branch": build_detail_json(build),
        "commit": commit_json(build),
    })))
}

async fn get_key(Path((owner, repo)): Path<(String, String)>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    known_repo(&owner, &repo)?;
    Ok(Json(json!({ "key": PUBLIC_KEY_PEM, "fingerprint": KEY_FINGERPRINT })))
}

async fn get_build(
    State(state): State<MockState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let builds = state.builds.read().await;
    let build = builds.iter().find(|b| b.id == id).ok_or_else(not_found)?;
    let jobs: Vec<Value> = build
        .job_ids
        .iter()
        .map(|&job| {
            json!({
                "id": job,
                "build_id": build.id,
                "log_id": job,
                "number": format!("{}.1", build.number),
                "state": build.state,
                "allow_failure": false,
            })
        })
        .collect();
    Ok(Json(json!({
        "build": build_detail_json(build),
        "commit": commit_json(build),
        "jobs": jobs,
    })))
}

/// Served as ISO-8859-1 so clients must honour the advertised charset.
async fn get_log(State(state): State<MockState>, Path(id): Path<u64>) -> Response {
    let builds = state.builds.read().await;
    let Some(build) = builds.iter().find(|b| b.job_ids.contains(&id)) else {
        return not_found().into_response();
    };
    let text = json!({
        "log": {
            "id": id,
            "job_id": id,
            "type": "Log",
            "body": format!("Build #{}: café compiled\n", build.number),
        }
    })
    .to_string();
    let latin1: Vec<u8> = text.chars().map(|c| u8::try_from(c).unwrap_or(b'?')).collect();
    (
        [(header::CONTENT_TYPE, "application/json; charset=ISO-8859-1")],
        latin1,
    )
        .into_response()
}

async fn uptime() -> Json<bool> {
    Json(true)
}
