//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port, then drives `Travis`
//! with the default ureq transport over real HTTP. The server records every
//! request so the composite operations can be checked call by call.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};
use travis_core::{ApiError, ExposeSecret, SecretString, Travis};

use mock_server::{MockState, ACCESS_TOKEN, GITHUB_TOKEN, KEY_FINGERPRINT, OWNER, PUBLIC_KEY_PEM, REPO};

const PRIVATE_KEY_PEM: &str = include_str!("../../test-vectors/keys/repo_key.pem");

/// Start the mock server on a random port and return its base URL.
fn spawn_server(state: MockState) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_state(listener, state).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn travis() -> (Travis, MockState) {
    let state = MockState::new();
    let base_url = spawn_server(state.clone());
    (Travis::with_base_url(&base_url), state)
}

fn access_token() -> SecretString {
    SecretString::from(ACCESS_TOKEN.to_string())
}

#[test]
fn read_endpoints() {
    let (travis, state) = travis();

    let info = travis.get_repo(OWNER, REPO).unwrap();
    assert_eq!(info.repo.slug.as_deref(), Some("hansjorg/rustci-test-project"));
    assert_eq!(info.repo.last_build_id, Some(203));

    let builds = travis.get_repo_builds(OWNER, REPO).unwrap();
    assert_eq!(builds.iter().map(|b| b.id).collect::<Vec<_>>(), vec![203, 202, 201]);
    assert_eq!(builds[1].branch.as_deref(), Some("develop"));

    let branch = travis.get_last_build_on_branch(OWNER, REPO, "master").unwrap();
    assert_eq!(branch.branch.id, 203);
    assert_eq!(branch.commit.unwrap().sha.as_deref(), Some("c3d4e5f"));

    let build = travis.get_build_by_id(202).unwrap();
    assert_eq!(build.build.number.as_deref(), Some("2"));
    let log_id = build.jobs[0].log_id.unwrap();

    let log = travis.get_log(log_id).unwrap();
    assert_eq!(log.log.body.as_deref(), Some("Build #2: café compiled\n"));

    let key = travis.get_public_key(OWNER, REPO).unwrap();
    assert_eq!(key.key, PUBLIC_KEY_PEM);
    assert_eq!(key.fingerprint.as_deref(), Some(KEY_FINGERPRINT));

    assert_eq!(travis.get_uptime().unwrap(), serde_json::Value::Bool(true));

    assert_eq!(
        state.hits(),
        vec![
            "GET /repos/hansjorg/rustci-test-project",
            "GET /repos/hansjorg/rustci-test-project/builds",
            "GET /repos/hansjorg/rustci-test-project/branches/master",
            "GET /builds/202",
            "GET /logs/2021",
            "GET /repos/hansjorg/rustci-test-project/key",
            "GET /uptime/",
        ]
    );
}

#[test]
fn unknown_repo_is_http_404() {
    let (travis, _) = travis();
    let err = travis.get_repo("nobody", "nothing").unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err:?}");
}

#[test]
fn token_exchange() {
    let (travis, _) = travis();

    let github = SecretString::from(GITHUB_TOKEN.to_string());
    let token = travis.get_travis_token(&github).unwrap().unwrap();
    assert_eq!(token.expose_secret(), ACCESS_TOKEN);

    let wrong = SecretString::from("wrong".to_string());
    let err = travis.get_travis_token(&wrong).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 403, .. }));
}

#[test]
fn restart_without_valid_token_is_forbidden() {
    let (travis, state) = travis();
    let bogus = SecretString::from("bogus".to_string());
    let err = travis.restart_build(&bogus, 203).unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(state.build_state(203).as_deref(), Some("failed"));
}

#[test]
fn trigger_build_restart_restarts_first_listed_build() {
    let (travis, state) = travis();

    let restarted = travis.trigger_build_restart(&access_token(), OWNER, REPO).unwrap();
    assert!(restarted);
    assert_eq!(
        state.hits(),
        vec!["GET /repos/hansjorg/rustci-test-project/builds", "POST /requests"]
    );
    assert_eq!(state.build_state(203).as_deref(), Some("created"));
}

#[test]
fn trigger_branch_build_restart_restarts_branch_head() {
    let (travis, state) = travis();

    let response = travis
        .trigger_branch_build_restart(&access_token(), OWNER, REPO, "develop")
        .unwrap();
    assert!(response.result);
    assert_eq!(response.flash[0]["notice"], "The build was successfully restarted.");
    assert_eq!(
        state.hits(),
        vec!["GET /repos/hansjorg/rustci-test-project/branches/develop", "POST /requests"]
    );
    assert_eq!(state.build_state(202).as_deref(), Some("created"));
    assert_eq!(state.build_state(203).as_deref(), Some("failed"));
}

#[test]
fn secure_env_var_decrypts_with_repo_private_key() {
    let (travis, state) = travis();

    let encoded = travis.get_secure_env_var(OWNER, REPO, "HIDDEN", "value").unwrap();

    let private = RsaPrivateKey::from_pkcs8_pem(PRIVATE_KEY_PEM).unwrap();
    let ciphertext = STANDARD.decode(encoded).unwrap();
    let plaintext = private.decrypt(Pkcs1v15Encrypt, &ciphertext).unwrap();
    assert_eq!(plaintext, b"HIDDEN=value");
    assert_eq!(state.hits(), vec!["GET /repos/hansjorg/rustci-test-project/key"]);
}

#[test]
fn connection_refused_is_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let travis = Travis::with_base_url(&format!("http://{addr}"));
    let err = travis.get_uptime().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "unexpected error: {err:?}");
}
