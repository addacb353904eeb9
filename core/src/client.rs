//! Stateless request builder and response parser for the Travis CI API.
//!
//! # Design
//! `TravisClient` holds only a `base_url` and carries no mutable state between
//! calls. Every endpoint has a `build_*` method producing an `HttpRequest`;
//! all responses go through the single generic `parse`. Together they form
//! the call helper: the request half attaches the JSON content type and the
//! optional `Authorization: token <token>` header, the response half turns
//! non-2xx statuses and undecodable payloads into `ApiError` values.
//!
//! Requests with a body are POSTs, requests without one are GETs.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AuthRequest, RestartRequest};

/// Public Travis CI API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.travis-ci.org";

/// `Content-Type` sent with every request.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Synchronous, stateless client for the Travis CI API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. See `Travis` for the variant that also performs the
/// round-trip.
#[derive(Debug, Clone)]
pub struct TravisClient {
    base_url: String,
}

impl TravisClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request half of the call helper.
    ///
    /// `body` must already be JSON text. The `Authorization` header comes
    /// first when a token is supplied, followed by the content type.
    pub fn build_call(&self, path: &str, token: Option<&SecretString>, body: Option<String>) -> HttpRequest {
        let mut headers = Vec::with_capacity(2);
        if let Some(token) = token {
            headers.push((
                "Authorization".to_string(),
                format!("token {}", token.expose_secret()),
            ));
        }
        headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));

        let method = if body.is_some() {
            HttpMethod::Post
        } else {
            HttpMethod::Get
        };
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }

    fn build_json<B: Serialize>(&self, path: &str, token: Option<&SecretString>, body: &B) -> Result<HttpRequest> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.build_call(path, token, Some(body)))
    }

    /// Exchange a GitHub OAuth token for a Travis access token.
    pub fn build_get_travis_token(&self, github_token: &SecretString) -> Result<HttpRequest> {
        let body = AuthRequest {
            github_token: github_token.expose_secret(),
        };
        self.build_json("/auth/github", None, &body)
    }

    pub fn build_restart_build(&self, travis_token: &SecretString, build_id: u64) -> Result<HttpRequest> {
        self.build_json("/requests", Some(travis_token), &RestartRequest { build_id })
    }

    pub fn build_get_repo(&self, owner: &str, repo: &str) -> HttpRequest {
        self.build_call(&format!("/repos/{owner}/{repo}"), None, None)
    }

    pub fn build_get_repo_builds(&self, owner: &str, repo: &str) -> HttpRequest {
        self.build_call(&format!("/repos/{owner}/{repo}/builds"), None, None)
    }

    pub fn build_get_last_build_on_branch(&self, owner: &str, repo: &str, branch: &str) -> HttpRequest {
        self.build_call(&format!("/repos/{owner}/{repo}/branches/{branch}"), None, None)
    }

    pub fn build_get_public_key(&self, owner: &str, repo: &str) -> HttpRequest {
        self.build_call(&format!("/repos/{owner}/{repo}/key"), None, None)
    }

    pub fn build_get_build_by_id(&self, id: u64) -> HttpRequest {
        self.build_call(&format!("/builds/{id}"), None, None)
    }

    pub fn build_get_log(&self, log_id: u64) -> HttpRequest {
        self.build_call(&format!("/logs/{log_id}"), None, None)
    }

    pub fn build_get_uptime(&self) -> HttpRequest {
        self.build_call("/uptime/", None, None)
    }

    /// Response half of the call helper.
    ///
    /// Non-2xx statuses become `ApiError::Http` with the raw body. The body
    /// is decoded with the charset from `Content-Type` (UTF-8 when absent)
    /// and then deserialized; an empty or malformed payload becomes
    /// `ApiError::Decode`. Both failures are logged at warn level.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T> {
        if !response.is_success() {
            let body = response.body_lossy();
            warn!(status = response.status, body = %body, "error response from Travis");
            return Err(ApiError::Http {
                status: response.status,
                body,
            });
        }
        if response.body.is_empty() {
            warn!(status = response.status, "empty response body");
            return Err(ApiError::Decode {
                message: "empty response body".to_string(),
                body: String::new(),
            });
        }

        let text = decode_text(&response)?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %text, "unable to deserialize JSON response");
            ApiError::Decode {
                message: e.to_string(),
                body: text.clone(),
            }
        })
    }
}

impl Default for TravisClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Decode the body using the advertised charset.
fn decode_text(response: &HttpResponse) -> Result<String> {
    match response.charset().as_deref() {
        None | Some("utf-8") | Some("utf8") => String::from_utf8(response.body.clone()).map_err(|e| {
            warn!(error = %e, "response body is not valid UTF-8");
            ApiError::Decode {
                message: e.to_string(),
                body: response.body_lossy(),
            }
        }),
        // Latin-1 maps each byte to the code point of the same value.
        Some("iso-8859-1") | Some("latin1") | Some("latin-1") => {
            Ok(response.body.iter().map(|&b| char::from(b)).collect())
        }
        Some("us-ascii") | Some("ascii") => match response.body.iter().position(|b| !b.is_ascii()) {
            None => Ok(response.body.iter().map(|&b| char::from(b)).collect()),
            Some(offset) => {
                warn!(offset, "response body is not valid ASCII");
                Err(ApiError::Decode {
                    message: format!("invalid ASCII byte 0x{:02X} at offset {offset}", response.body[offset]),
                    body: response.body_lossy(),
                })
            }
        },
        Some(other) => {
            warn!(charset = other, "unsupported response charset");
            Err(ApiError::Decode {
                message: format!("unsupported charset: {other}"),
                body: response.body_lossy(),
            })
        }
    }
}
