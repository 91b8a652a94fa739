//! End-to-end flow tests for each request class.

use std::time::Duration;

use dispatchd::config::DispatchConfig;

mod common;

fn base_config() -> DispatchConfig {
    let mut config = DispatchConfig::default();
    config.pool.workers = Some(2);
    config.pool.queue_depth = 8;
    config.timeouts.io_op_ms = Some(5_000);
    config
}

#[tokio::test]
async fn fast_route_responds_ok() {
    let server = common::spawn_server(base_config()).await;
    let client = common::client();

    let res = client
        .get(server.url("/fast"))
        .send()
        .await
        .expect("server reachable");

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: serde_json::Value = res.json().await.expect("json body");
    assert_eq!(body["message"], "ok");
}

#[tokio::test]
async fn cpu_route_returns_derived_key() {
    let server = common::spawn_server(base_config()).await;
    let client = common::client();

    let res = client
        .get(server.url("/cpu/derive?iterations=1000&length=32"))
        .send()
        .await
        .expect("server reachable");

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("json body");
    let key = body["key"].as_str().expect("key is string");
    assert_eq!(key.len(), 64); // 32 bytes hex-encoded

    // Deterministic computation: a second call yields the same key.
    let res2 = client
        .get(server.url("/cpu/derive?iterations=1000&length=32"))
        .send()
        .await
        .expect("server reachable");
    let body2: serde_json::Value = res2.json().await.expect("json body");
    assert_eq!(body2["key"], body["key"]);
}

#[tokio::test]
async fn invalid_cpu_params_rejected_with_400() {
    let server = common::spawn_server(base_config()).await;
    let client = common::client();

    let res = client
        .get(server.url("/cpu/derive?iterations=0"))
        .send()
        .await
        .expect("server reachable");

    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.expect("json body");
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn io_fetch_reports_backend_status_and_size() {
    let backend = common::start_delayed_backend(Duration::from_millis(10)).await;
    let server = common::spawn_server(base_config()).await;
    let client = common::client();

    let res = client
        .get(server.url(&format!("/io/fetch?url=http://{}/", backend)))
        .send()
        .await
        .expect("server reachable");

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("json body");
    assert_eq!(body["status"], 200);
    assert!(body["bytes"].as_u64().expect("bytes") > 0);
}

#[tokio::test]
async fn io_fetch_rejects_bad_scheme() {
    let server = common::spawn_server(base_config()).await;
    let client = common::client();

    let res = client
        .get(server.url("/io/fetch?url=ftp://example.com"))
        .send()
        .await
        .expect("server reachable");

    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn io_file_reads_from_data_dir() {
    let dir = std::env::temp_dir().join(format!("dispatchd-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create data dir");
    std::fs::write(dir.join("notes.txt"), b"twelve bytes").expect("write fixture");

    let mut config = base_config();
    config.transport.data_dir = dir.to_string_lossy().into_owned();
    let server = common::spawn_server(config).await;
    let client = common::client();

    let res = client
        .get(server.url("/io/file?name=notes.txt"))
        .send()
        .await
        .expect("server reachable");

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("json body");
    assert_eq!(body["bytes"], 12);

    let missing = client
        .get(server.url("/io/file?name=absent.txt"))
        .send()
        .await
        .expect("server reachable");
    assert_eq!(missing.status(), 502);

    let traversal = client
        .get(server.url("/io/file?name=..%2Fsecret"))
        .send()
        .await
        .expect("server reachable");
    assert_eq!(traversal.status(), 400);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn status_reports_pool_shape() {
    let server = common::spawn_server(base_config()).await;
    let client = common::client();

    let res = client
        .get(server.url("/status"))
        .send()
        .await
        .expect("server reachable");

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.expect("json body");
    assert_eq!(body["pool_size"], 2);
    assert_eq!(body["queue_depth"], 8);
    assert_eq!(body["pending_operations"], 0);
}
