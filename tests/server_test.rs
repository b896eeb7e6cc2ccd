use dirsum::{ServerConfig, SortOrder, server};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use tempfile::tempdir;
use tokio::net::TcpListener;

/// Serve the router for `config` on an ephemeral port
async fn spawn_server(config: ServerConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server::router(config).unwrap())
            .await
            .unwrap();
    });
    addr
}

fn config_for(root: &Path) -> ServerConfig {
    ServerConfig {
        root: root.to_path_buf(),
        ..ServerConfig::default()
    }
}

fn sample_tree() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), vec![b'a'; 500]).unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/b.bin"), vec![b'b'; 1500]).unwrap();
    dir
}

#[tokio::test]
async fn test_lists_configured_root() {
    let dir = sample_tree();
    let root = dir.path().canonicalize().unwrap();
    let addr = spawn_server(config_for(&root)).await;

    let response = reqwest::get(format!("http://{addr}/api/files")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!([
            { "path": root.join("sub").display().to_string(), "size": "1.5 KB", "is_dir": true },
            { "path": root.join("a.txt").display().to_string(), "size": "500 B", "is_dir": false },
        ])
    );
}

#[tokio::test]
async fn test_path_and_sort_parameters() {
    let served = tempdir().unwrap();
    let other = sample_tree();
    let addr = spawn_server(config_for(served.path())).await;

    let client = reqwest::Client::new();
    let body: Value = client
        .get(format!("http://{addr}/api/files"))
        .query(&[("path", other.path().to_str().unwrap()), ("sort", "asc")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let sizes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["size"].as_str().unwrap())
        .collect();
    assert_eq!(sizes, vec!["500 B", "1.5 KB"]);
}

#[tokio::test]
async fn test_unknown_sort_falls_back_to_descending() {
    let dir = sample_tree();
    let config = ServerConfig {
        default_sort: SortOrder::Ascending,
        ..config_for(dir.path())
    };
    let addr = spawn_server(config).await;

    let body: Value = reqwest::get(format!("http://{addr}/api/files?sort=sideways"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body[0]["size"], "1.5 KB");

    // No sort parameter uses the configured default
    let body: Value = reqwest::get(format!("http://{addr}/api/files"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body[0]["size"], "500 B");
}

#[tokio::test]
async fn test_concurrent_requests_share_workers() {
    let dir = sample_tree();
    let config = ServerConfig {
        scan: dirsum::ScanOptions {
            max_in_flight: std::num::NonZeroUsize::new(1).unwrap(),
        },
        ..config_for(dir.path())
    };
    let addr = spawn_server(config).await;

    let client = reqwest::Client::new();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .get(format!("http://{addr}/api/files"))
                    .send()
                    .await
                    .unwrap()
                    .json::<Value>()
                    .await
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        let body = handle.await.unwrap();
        assert_eq!(body[0]["size"], "1.5 KB");
        assert_eq!(body[1]["size"], "500 B");
    }
}

#[tokio::test]
async fn test_empty_root_is_empty_array() {
    let dir = tempdir().unwrap();
    let addr = spawn_server(config_for(dir.path())).await;

    let body: Value = reqwest::get(format!("http://{addr}/api/files"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_missing_path_is_not_found() {
    let dir = tempdir().unwrap();
    let addr = spawn_server(config_for(dir.path())).await;

    let missing = dir.path().join("missing");
    let response = reqwest::Client::new()
        .get(format!("http://{addr}/api/files"))
        .query(&[("path", missing.to_str().unwrap())])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.text().await.unwrap().contains("Directory not found"));
}

#[tokio::test]
async fn test_file_path_is_not_found() {
    let dir = sample_tree();
    let addr = spawn_server(config_for(dir.path())).await;

    let file = dir.path().join("a.txt");
    let response = reqwest::Client::new()
        .get(format!("http://{addr}/api/files"))
        .query(&[("path", file.to_str().unwrap())])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.text().await.unwrap().contains("is not a directory"));
}

#[tokio::test]
async fn test_serves_front_end() {
    let dir = tempdir().unwrap();
    let addr = spawn_server(config_for(dir.path())).await;

    let index = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    assert!(index.text().await.unwrap().contains("<script src=\"/static/app.js\">"));

    let script = reqwest::get(format!("http://{addr}/static/app.js")).await.unwrap();
    assert_eq!(script.status(), StatusCode::OK);
    assert!(
        script.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/javascript")
    );

    let missing = reqwest::get(format!("http://{addr}/static/nope.js")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
