//! HTTP-level tests for the health and download routes.

mod common;

use common::TestHarness;

#[tokio::test]
async fn health_reports_stub_tools() {
    let (_harness, base) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("{base}/api/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let tools = body["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);
    assert!(tools.iter().all(|t| t["available"] == true));
}

#[tokio::test]
async fn download_serves_artifact_as_attachment() {
    let (harness, base) = TestHarness::with_server().await;

    let path = harness.output_root.join("gifs").join("known.gif");
    std::fs::write(&path, b"GIF89a-test").unwrap();

    let resp = reqwest::get(format!("{base}/download/gifs/known.gif"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "image/gif");
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=\"known.gif\""
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"GIF89a-test");
}

#[tokio::test]
async fn download_missing_artifact_is_404() {
    let (_harness, base) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("{base}/download/gifs/nope.gif"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn download_unknown_category_is_rejected() {
    let (_harness, base) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("{base}/download/secrets/file.gif"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn download_traversal_is_rejected() {
    let (harness, base) = TestHarness::with_server().await;

    // A file outside the category dir that traversal would reach.
    std::fs::write(harness.output_root.join("outside.txt"), b"secret").unwrap();

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{base}/download/gifs/..%2Foutside.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
