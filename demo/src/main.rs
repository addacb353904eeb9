//! Fetches a sample repository's info, its master branch build and public
//! key, then prints an encrypted `HIDDEN=value` secure variable.
//!
//! `TRAVIS_BASE_URL` overrides the API endpoint (e.g. to point at the mock
//! server); `RUST_LOG` controls log output.

use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;
use travis_core::{Travis, DEFAULT_BASE_URL};

const OWNER: &str = "hansjorg";
const REPO: &str = "rustci-test-project";
const BRANCH: &str = "master";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let base_url = std::env::var("TRAVIS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let travis = Travis::with_base_url(&base_url);

    match run(&travis) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run(travis: &Travis) -> Result<(), Box<dyn std::error::Error>> {
    let repo = travis.get_repo(OWNER, REPO)?;
    println!("{}", serde_json::to_string_pretty(&repo)?);

    let branch = travis.get_last_build_on_branch(OWNER, REPO, BRANCH)?;
    println!("{}", serde_json::to_string_pretty(&branch)?);

    let key = travis.get_public_key(OWNER, REPO)?;
    println!("{}", key.key);

    println!("{}", travis.get_secure_env_var(OWNER, REPO, "HIDDEN", "value")?);
    Ok(())
}
