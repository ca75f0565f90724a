//! End-to-end generation against a mocked OpenAI-compatible endpoint

use assetforge::config::AssetConfig;
use assetforge::generation;
use assetforge::provider::{ProviderFactory, API_KEY_ENV};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::integration::{write_manifest, TestWorkspace};

fn config_for(server: &MockServer, ws: &TestWorkspace) -> AssetConfig {
    let mut config = AssetConfig::default();
    config.provider.api_key = Some("test-key".to_string());
    config.provider.endpoint = Some(server.uri());
    config.generation.images_per_item = 1;
    config.generation.throttle_secs = 0.0;
    config.generation.manifest_path = ws.manifest_path();
    config.generation.output_dir = ws.output_dir();
    config
}

#[tokio::test]
async fn test_inline_and_remote_results_write_identical_bytes() {
    let server = MockServer::start().await;
    let pixels = b"same-pixels".to_vec();

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"{{"data":[{{"b64_json":"{}"}}]}}"#,
            STANDARD.encode(&pixels)
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/images/edits"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"{{"data":[{{"url":"{}/files/tree.png"}}]}}"#,
            server.uri()
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/tree.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pixels.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let ws = TestWorkspace::new();
    write_manifest(
        &ws.manifest_path(),
        &[("rock", "a mossy rock"), ("tree", "a pine tree")],
    );

    let summary = generation::run(&config_for(&server, &ws), ws.root())
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    let rock = std::fs::read(ws.output_dir().join("rock.png")).unwrap();
    let tree = std::fs::read(ws.output_dir().join("tree.png")).unwrap();
    assert_eq!(rock, pixels);
    assert_eq!(tree, rock);
}

#[tokio::test]
async fn test_auth_failure_stops_before_writing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let ws = TestWorkspace::new();
    write_manifest(&ws.manifest_path(), &[("rock", "a mossy rock")]);

    let err = generation::run(&config_for(&server, &ws), ws.root())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        assetforge::error::AssetError::ProviderAuthFailed(_)
    ));
    assert!(!ws.output_dir().join("rock.png").exists());
}

/// Serializes access to the credential environment variable within this test binary
static CREDENTIAL_ENV_MUTEX: Mutex<()> = Mutex::new(());

#[tokio::test]
async fn test_blank_credential_is_configuration_error() {
    let server = MockServer::start().await;
    let ws = TestWorkspace::new();
    write_manifest(&ws.manifest_path(), &[("rock", "a mossy rock")]);

    let mut config = config_for(&server, &ws);
    config.provider.api_key = Some("   ".to_string());

    let _guard = CREDENTIAL_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let original = std::env::var_os(API_KEY_ENV);
    std::env::remove_var(API_KEY_ENV);

    let factory_result = ProviderFactory::create(&config.provider).map(|_| ());
    let run_result = generation::run(&config, ws.root()).await;

    if let Some(value) = original {
        std::env::set_var(API_KEY_ENV, value);
    }

    assert!(factory_result.unwrap_err().is_configuration_error());
    assert!(run_result.unwrap_err().is_configuration_error());
    assert!(!ws.output_dir().exists());
    assert!(server.received_requests().await.unwrap().is_empty());
}
