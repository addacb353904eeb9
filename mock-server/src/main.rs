//! Serves the fake Travis API on `127.0.0.1:$PORT` (default 3000).
//!
//! Point the demo at it with `TRAVIS_BASE_URL=http://127.0.0.1:3000`.

use std::net::{Ipv4Addr, SocketAddr};

use mock_server::{ACCESS_TOKEN, GITHUB_TOKEN, OWNER, REPO};
use tokio::net::TcpListener;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port = match std::env::var("PORT") {
        Ok(raw) => raw.parse::<u16>().map_err(|e| format!("invalid PORT {raw:?}: {e}"))?,
        Err(_) => DEFAULT_PORT,
    };
    let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, port))).await?;
    let addr = listener.local_addr()?;

    eprintln!("fake Travis API listening on http://{addr}");
    eprintln!("  repository: {OWNER}/{REPO}");
    eprintln!("  github token {GITHUB_TOKEN:?} exchanges for {ACCESS_TOKEN:?}");

    mock_server::run(listener).await?;
    Ok(())
}
