//! Blocking Travis CI client: `TravisClient` plus a `Transport`.
//!
//! Each operation issues one request (the restart triggers issue two, lookup
//! then restart) and returns the typed response. Nothing is cached or shared
//! between calls.

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::TravisClient;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, Transport, UreqTransport};
use crate::secure::encrypt_secure_var;
use crate::types::{AuthResponse, BranchInfo, Build, BuildInfo, KeyInfo, LogInfo, RepoInfo, RestartResponse};

/// Travis CI API client that performs requests over a `Transport`.
///
/// # Examples
///
/// ```no_run
/// use travis_core::Travis;
///
/// # fn example() -> travis_core::Result<()> {
/// let travis = Travis::new();
/// let info = travis.get_repo("hansjorg", "rustci-test-project")?;
/// println!("last build: {:?}", info.repo.last_build_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Travis<T = UreqTransport> {
    client: TravisClient,
    transport: T,
}

impl Travis<UreqTransport> {
    /// Client for the public API at `https://api.travis-ci.org`.
    pub fn new() -> Self {
        Self::with_transport(TravisClient::default(), UreqTransport::new())
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self::with_transport(TravisClient::new(base_url), UreqTransport::new())
    }
}

impl Default for Travis<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Travis<T> {
    pub fn with_transport(client: TravisClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TravisClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R> {
        let response = self.transport.execute(&request)?;
        self.client.parse(response)
    }

    /// Exchange a GitHub OAuth token for a Travis access token.
    ///
    /// The GitHub token needs at least the scope Travis itself uses
    /// (`public_repo`). Returns `Ok(None)` when the service answers without
    /// an `access_token`.
    #[instrument(skip_all)]
    pub fn get_travis_token(&self, github_token: &SecretString) -> Result<Option<SecretString>> {
        let response: AuthResponse = self.call(self.client.build_get_travis_token(github_token)?)?;
        Ok(response.access_token.map(SecretString::from))
    }

    #[instrument(skip(self, travis_token))]
    pub fn restart_build(&self, travis_token: &SecretString, build_id: u64) -> Result<RestartResponse> {
        self.call(self.client.build_restart_build(travis_token, build_id)?)
    }

    #[instrument(skip(self))]
    pub fn get_repo(&self, owner: &str, repo: &str) -> Result<RepoInfo> {
        self.call(self.client.build_get_repo(owner, repo))
    }

    /// Builds of a repository, in the order the service returns them.
    #[instrument(skip(self))]
    pub fn get_repo_builds(&self, owner: &str, repo: &str) -> Result<Vec<Build>> {
        self.call(self.client.build_get_repo_builds(owner, repo))
    }

    #[instrument(skip(self))]
    pub fn get_last_build_on_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<BranchInfo> {
        self.call(self.client.build_get_last_build_on_branch(owner, repo, branch))
    }

    #[instrument(skip(self))]
    pub fn get_public_key(&self, owner: &str, repo: &str) -> Result<KeyInfo> {
        self.call(self.client.build_get_public_key(owner, repo))
    }

    #[instrument(skip(self))]
    pub fn get_build_by_id(&self, id: u64) -> Result<BuildInfo> {
        self.call(self.client.build_get_build_by_id(id))
    }

    #[instrument(skip(self))]
    pub fn get_log(&self, log_id: u64) -> Result<LogInfo> {
        self.call(self.client.build_get_log(log_id))
    }

    #[instrument(skip(self))]
    pub fn get_uptime(&self) -> Result<Value> {
        self.call(self.client.build_get_uptime())
    }

    /// Encrypt `VAR=value` with the repository's public key for use as a
    /// secure environment variable in `.travis.yml`.
    ///
    /// The key is fetched on every call.
    #[instrument(skip(self, var, value))]
    pub fn get_secure_env_var(&self, owner: &str, repo: &str, var: &str, value: &str) -> Result<String> {
        let key = self.get_public_key(owner, repo)?;
        Ok(encrypt_secure_var(&key.key, var, value)?)
    }

    /// Restart the last build on `branch`. Only restarts an existing build,
    /// never creates one.
    ///
    /// Lookup and restart are separate requests; a build started in between
    /// is not noticed.
    #[instrument(skip(self, travis_token))]
    pub fn trigger_branch_build_restart(
        &self,
        travis_token: &SecretString,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<RestartResponse> {
        let last_build_id = self.get_last_build_on_branch(owner, repo, branch)?.branch.id;
        debug!(build_id = last_build_id, "restarting last build on branch");
        self.restart_build(travis_token, last_build_id)
    }

    /// Restart the most recent build of a repository and return whether the
    /// service accepted the restart.
    ///
    /// "Most recent" is the first entry of the builds list; the service does
    /// not document that ordering.
    #[instrument(skip(self, travis_token))]
    pub fn trigger_build_restart(&self, travis_token: &SecretString, owner: &str, repo: &str) -> Result<bool> {
        let builds = self.get_repo_builds(owner, repo)?;
        let last_build_id = builds
            .first()
            .map(|build| build.id)
            .ok_or_else(|| ApiError::UnexpectedResponse(format!("{owner}/{repo} has no builds")))?;
        debug!(build_id = last_build_id, "restarting most recent build");
        Ok(self.restart_build(travis_token, last_build_id)?.result)
    }
}
