//! Synchronous client for the Travis CI v2 HTTP API.
//!
//! # Overview
//! Fetches repository, build, branch, log and key information, exchanges a
//! GitHub token for a Travis token, restarts builds, and encrypts secure
//! environment variables with a repository's public key.
//!
//! # Design
//! - `TravisClient` is stateless and does no I/O: `build_*` methods produce
//!   `HttpRequest` values and `parse` consumes `HttpResponse` values.
//! - `Travis` pairs a `TravisClient` with a `Transport` (by default the
//!   blocking `UreqTransport`) and exposes one method per endpoint plus the
//!   composite restart triggers and `get_secure_env_var`.
//! - Responses decode into per-endpoint types immediately after transport.
//! - Tokens are `secrecy::SecretString` and never logged.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod secure;
pub mod types;

pub use api::Travis;
pub use client::{TravisClient, DEFAULT_BASE_URL};
pub use error::{ApiError, CryptoError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use secrecy::{ExposeSecret, SecretString};
pub use secure::encrypt_secure_var;
pub use types::{
    AuthRequest, AuthResponse, BranchInfo, Build, BuildInfo, Commit, Job, KeyInfo, Log, LogInfo, Repo,
    RepoInfo, RestartRequest, RestartResponse,
};
