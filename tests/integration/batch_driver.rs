//! Integration tests for the resumable batch driver

use assetforge::generation::{run_batch, AnchorPolicy};
use assetforge::provider::{ImageOutput, MockImageProvider};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::integration::{item_outputs, write_manifest, TestWorkspace};

fn inline(bytes: &[u8]) -> ImageOutput {
    ImageOutput::InlineData(STANDARD.encode(bytes))
}

#[tokio::test]
async fn test_rock_tree_first_output_chain() {
    let ws = TestWorkspace::new();
    write_manifest(
        &ws.manifest_path(),
        &[("rock", "a mossy rock"), ("tree", "a pine tree")],
    );
    let settings = ws.settings(AnchorPolicy::FirstOutput, 2);
    let mock = MockImageProvider::new();

    let summary = run_batch(&settings, Box::new(mock.clone())).await.unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 0);

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].prompt, "a mossy rock");
    assert_eq!(requests[0].reference, None);
    assert_eq!(requests[1].prompt, "a pine tree");
    assert_eq!(
        requests[1].reference,
        Some(ws.output_dir().join("rock_v1.png"))
    );

    let out = ws.output_dir();
    for (name, prompt) in [("rock", "a mossy rock"), ("tree", "a pine tree")] {
        for n in 0..2 {
            let path = out.join(format!("{}_v{}.png", name, n + 1));
            assert_eq!(
                std::fs::read(&path).unwrap(),
                MockImageProvider::image_bytes(prompt, n)
            );
        }
    }
    assert_eq!(item_outputs(&out).len(), 4);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let ws = TestWorkspace::new();
    write_manifest(
        &ws.manifest_path(),
        &[("rock", "a mossy rock"), ("tree", "a pine tree")],
    );
    let settings = ws.settings(AnchorPolicy::FirstOutput, 2);
    run_batch(&settings, Box::new(MockImageProvider::new()))
        .await
        .unwrap();
    let before = item_outputs(&ws.output_dir());

    let second = MockImageProvider::new();
    let summary = run_batch(&settings, Box::new(second.clone())).await.unwrap();

    assert_eq!(second.call_count(), 0);
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(item_outputs(&ws.output_dir()), before);
}

#[tokio::test]
async fn test_partial_item_is_regenerated_in_full() {
    let ws = TestWorkspace::new();
    write_manifest(&ws.manifest_path(), &[("rock", "a mossy rock")]);
    std::fs::create_dir_all(ws.output_dir()).unwrap();
    std::fs::write(ws.output_dir().join("rock_v1.png"), b"stale").unwrap();

    let settings = ws.settings(AnchorPolicy::FirstOutput, 2);
    let mock = MockImageProvider::new();
    let summary = run_batch(&settings, Box::new(mock.clone())).await.unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(mock.call_count(), 1);
    assert_eq!(
        std::fs::read(ws.output_dir().join("rock_v1.png")).unwrap(),
        MockImageProvider::image_bytes("a mossy rock", 0)
    );
    assert_eq!(
        std::fs::read(ws.output_dir().join("rock_v2.png")).unwrap(),
        MockImageProvider::image_bytes("a mossy rock", 1)
    );
}

#[tokio::test]
async fn test_first_output_anchor_ignores_skipped_items() {
    let ws = TestWorkspace::new();
    write_manifest(
        &ws.manifest_path(),
        &[("rock", "a rock"), ("tree", "a tree"), ("bush", "a bush")],
    );
    std::fs::create_dir_all(ws.output_dir()).unwrap();
    std::fs::write(ws.output_dir().join("rock.png"), b"done").unwrap();

    let settings = ws.settings(AnchorPolicy::FirstOutput, 1);
    let mock = MockImageProvider::new();
    let summary = run_batch(&settings, Box::new(mock.clone())).await.unwrap();

    assert_eq!(summary.skipped, 1);
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    // The first fresh generation of this run becomes the anchor
    assert_eq!(requests[0].reference, None);
    assert_eq!(requests[1].reference, Some(ws.output_dir().join("tree.png")));
}

#[tokio::test]
async fn test_chained_pointer_follows_latest_output() {
    let ws = TestWorkspace::new();
    let anchor = ws.write_anchor();
    write_manifest(
        &ws.manifest_path(),
        &[("rock", "a rock"), ("tree", "a tree"), ("bush", "a bush")],
    );
    std::fs::create_dir_all(ws.output_dir()).unwrap();
    std::fs::write(ws.output_dir().join("tree.png"), b"done").unwrap();

    let settings = ws.settings(AnchorPolicy::Chained { anchor: anchor.clone() }, 1);
    let mock = MockImageProvider::new();
    run_batch(&settings, Box::new(mock.clone())).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].prompt, "a rock");
    assert_eq!(requests[0].reference, Some(anchor));
    // tree was skipped but its existing output still advances the pointer
    assert_eq!(requests[1].prompt, "a bush");
    assert_eq!(requests[1].reference, Some(ws.output_dir().join("tree.png")));
}

#[tokio::test]
async fn test_empty_manifest_is_configuration_error() {
    let ws = TestWorkspace::new();
    write_manifest(&ws.manifest_path(), &[]);
    let mock = MockImageProvider::new();

    let err = run_batch(&ws.settings(AnchorPolicy::FirstOutput, 2), Box::new(mock.clone()))
        .await
        .unwrap_err();

    assert!(err.is_configuration_error());
    assert_eq!(mock.call_count(), 0);
    assert!(!ws.output_dir().exists());
}

#[tokio::test]
async fn test_missing_manifest_columns_rejected() {
    let ws = TestWorkspace::new();
    std::fs::write(ws.manifest_path(), "name,text\nrock,a rock\n").unwrap();
    let mock = MockImageProvider::new();

    let err = run_batch(&ws.settings(AnchorPolicy::FirstOutput, 2), Box::new(mock.clone()))
        .await
        .unwrap_err();

    assert!(err.is_configuration_error());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_missing_anchor_is_configuration_error() {
    let ws = TestWorkspace::new();
    write_manifest(&ws.manifest_path(), &[("rock", "a rock")]);
    let mock = MockImageProvider::new();
    let settings = ws.settings(
        AnchorPolicy::Chained {
            anchor: ws.root().join("missing.png"),
        },
        1,
    );

    let err = run_batch(&settings, Box::new(mock.clone())).await.unwrap_err();

    assert!(err.is_configuration_error());
    assert!(err.to_string().contains("missing.png"));
    assert_eq!(mock.call_count(), 0);
    assert!(!ws.output_dir().exists());
}

#[tokio::test]
async fn test_provider_failure_keeps_prior_outputs_and_resumes() {
    let ws = TestWorkspace::new();
    write_manifest(
        &ws.manifest_path(),
        &[("rock", "a rock"), ("tree", "a tree"), ("bush", "a bush")],
    );
    let settings = ws.settings(AnchorPolicy::FirstOutput, 1);

    let failing = MockImageProvider::new();
    failing.push_response(Ok(vec![inline(b"rock-pixels")]));
    failing.push_response(Err(assetforge::error::AssetError::ProviderRateLimit(
        "429".to_string(),
    )));
    let err = run_batch(&settings, Box::new(failing.clone()))
        .await
        .unwrap_err();

    assert!(err.is_provider_error());
    assert_eq!(failing.call_count(), 2);
    assert_eq!(
        std::fs::read(ws.output_dir().join("rock.png")).unwrap(),
        b"rock-pixels"
    );
    assert!(!ws.output_dir().join("tree.png").exists());
    assert!(!ws.output_dir().join("bush.png").exists());

    let resumed = MockImageProvider::new();
    let summary = run_batch(&settings, Box::new(resumed.clone())).await.unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.processed, 2);
    let prompts: Vec<String> = resumed.requests().into_iter().map(|r| r.prompt).collect();
    assert_eq!(prompts, vec!["a tree", "a bush"]);
    assert_eq!(
        std::fs::read(ws.output_dir().join("rock.png")).unwrap(),
        b"rock-pixels"
    );
}

#[tokio::test]
async fn test_unrecognized_result_aborts_item() {
    let ws = TestWorkspace::new();
    write_manifest(&ws.manifest_path(), &[("rock", "a rock")]);
    let mock = MockImageProvider::new();
    mock.push_response(Err(assetforge::error::AssetError::UnrecognizedResult(
        "no b64_json or url".to_string(),
    )));

    let err = run_batch(&ws.settings(AnchorPolicy::FirstOutput, 1), Box::new(mock))
        .await
        .unwrap_err();

    assert!(err.is_provider_error());
    assert!(item_outputs(&ws.output_dir()).is_empty());
}

#[tokio::test]
async fn test_failed_second_output_leaves_partial_item_incomplete() {
    use assetforge::generation::OutputLayout;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let ws = TestWorkspace::new();
    write_manifest(&ws.manifest_path(), &[("rock", "a mossy rock")]);
    std::fs::create_dir_all(ws.output_dir()).unwrap();
    std::fs::write(ws.output_dir().join("rock_v2.png"), b"stale-old-generation").unwrap();
    let settings = ws.settings(AnchorPolicy::FirstOutput, 2);

    let failing = MockImageProvider::new();
    failing.push_response(Ok(vec![
        inline(b"new-v1"),
        ImageOutput::RemoteReference(format!("{}/v2.png", server.uri())),
    ]));
    let err = run_batch(&settings, Box::new(failing)).await.unwrap_err();

    assert!(err.is_provider_error());
    let layout = OutputLayout::new(ws.output_dir(), 2, settings.output_format);
    assert!(!layout.is_complete("rock"));
    assert!(!ws.output_dir().join("rock_v1.png").exists());
    assert!(!ws.output_dir().join("rock_v1.png.part").exists());

    let resumed = MockImageProvider::new();
    let summary = run_batch(&settings, Box::new(resumed.clone())).await.unwrap();

    assert_eq!(resumed.call_count(), 1);
    assert_eq!(summary.processed, 1);
    assert_eq!(
        std::fs::read(ws.output_dir().join("rock_v2.png")).unwrap(),
        MockImageProvider::image_bytes("a mossy rock", 1)
    );
}
