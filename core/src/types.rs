//! Request and response DTOs for the Travis CI v2 API.
//!
//! # Design
//! The service owns these schemas and does not version them, so only the
//! fields composite operations rely on are required (`id` on builds, `key`
//! on key material, `result` on restarts). Everything else is optional or
//! defaulted and unknown fields are ignored. The mock server defines its own
//! payloads independently; integration tests catch schema drift.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /auth/github`.
#[derive(Clone, Serialize)]
pub struct AuthRequest<'a> {
    pub github_token: &'a str,
}

/// Response of `POST /auth/github`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Body of `POST /requests`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestartRequest {
    pub build_id: u64,
}

/// Response of `POST /requests`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestartResponse {
    pub result: bool,
    /// Notices and errors the service attaches, e.g.
    /// `{"notice": "The build was successfully restarted."}`.
    #[serde(default)]
    pub flash: Vec<Value>,
}

/// Response of `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepoInfo {
    pub repo: Repo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repo {
    pub id: u64,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub github_language: Option<String>,
    #[serde(default)]
    pub last_build_id: Option<u64>,
    #[serde(default)]
    pub last_build_number: Option<String>,
    #[serde(default)]
    pub last_build_state: Option<String>,
    #[serde(default)]
    pub last_build_duration: Option<u64>,
    #[serde(default)]
    pub last_build_started_at: Option<String>,
    #[serde(default)]
    pub last_build_finished_at: Option<String>,
}

/// A build as it appears in builds lists, branch lookups and build details.
///
/// Lists carry the commit inline (`commit` is the SHA, plus `branch` and
/// `message`); detail endpoints reference it through `commit_id` instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Build {
    pub id: u64,
    #[serde(default)]
    pub repository_id: Option<u64>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub result: Option<i64>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub commit_id: Option<u64>,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub pull_request: Option<bool>,
    #[serde(default)]
    pub job_ids: Vec<u64>,
    #[serde(default)]
    pub config: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Commit {
    pub id: u64,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub committed_at: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub committer_name: Option<String>,
    #[serde(default)]
    pub committer_email: Option<String>,
    #[serde(default)]
    pub compare_url: Option<String>,
}

/// Response of `GET /repos/{owner}/{repo}/branches/{branch}`: the last build
/// on that branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchInfo {
    pub branch: Build,
    #[serde(default)]
    pub commit: Option<Commit>,
}

/// Response of `GET /builds/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildInfo {
    pub build: Build,
    #[serde(default)]
    pub commit: Option<Commit>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: u64,
    #[serde(default)]
    pub build_id: Option<u64>,
    #[serde(default)]
    pub log_id: Option<u64>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub allow_failure: Option<bool>,
}

/// Response of `GET /repos/{owner}/{repo}/key`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyInfo {
    /// PEM-encoded RSA public key.
    pub key: String,
    #[serde(default)]
    pub fingerprint: Option<String>,
}

/// Response of `GET /logs/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogInfo {
    pub log: Log,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Log {
    pub id: u64,
    #[serde(default)]
    pub job_id: Option<u64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_list_entry_tolerates_sparse_fields() {
        let build: Build = serde_json::from_str(r#"{"id":42}"#).unwrap();
        assert_eq!(build.id, 42);
        assert!(build.number.is_none());
        assert!(build.job_ids.is_empty());
    }

    #[test]
    fn build_ignores_unknown_fields() {
        let build: Build =
            serde_json::from_str(r#"{"id":7,"number":"7","state":"passed","unheard_of":[1,2]}"#).unwrap();
        assert_eq!(build.state.as_deref(), Some("passed"));
    }

    #[test]
    fn branch_info_requires_branch_id() {
        let result: Result<BranchInfo, _> = serde_json::from_str(r#"{"branch":{"number":"3"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn restart_response_flash_defaults_empty() {
        let resp: RestartResponse = serde_json::from_str(r#"{"result":false}"#).unwrap();
        assert!(!resp.result);
        assert!(resp.flash.is_empty());
    }

    #[test]
    fn log_type_field_maps_to_kind() {
        let info: LogInfo =
            serde_json::from_str(r#"{"log":{"id":9,"job_id":3,"type":"Log","body":"ok"}}"#).unwrap();
        assert_eq!(info.log.kind.as_deref(), Some("Log"));
        assert_eq!(info.log.body.as_deref(), Some("ok"));
    }

    #[test]
    fn auth_response_without_token() {
        let resp: AuthResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.access_token.is_none());
    }
}
