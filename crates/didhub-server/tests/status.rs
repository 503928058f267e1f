use didhub_core::Registry;
use didhub_memory::MemoryStore;
use didhub_server::AppState;
use didhub_sqlite::SqliteStore;
use didhub_test_utils::{
    agent::{FailingAgent, StubAgent},
    store::FaultyStore,
};
use reqwest::StatusCode;
use serde_json::json;

mod utils;

use utils::{spawn_server, spawn_state, spawn_with_agent};

#[tokio::test]
async fn test_status() {
    let server = spawn_server().await;

    let (status, body) = server.get("/api/status").await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["agentConnected"], true);
    assert_eq!(data["storeOnline"], true);
    assert_eq!(data["backend"], "memory");
    assert_eq!(data["serverVersion"], env!("CARGO_PKG_VERSION"));
    assert_eq!(data["totalDids"], 0);
    assert_eq!(data["totalResolutions"], 0);
    assert_eq!(data["recentLogs"], json!([]));
    assert_eq!(data["lastSync"], json!(null));

    for _ in 0..3 {
        server
            .post("/api/did/create", &json!({ "method": "auto" }))
            .await;
    }

    let (_, body) = server.get("/api/status").await;
    let data = &body["data"];
    assert_eq!(data["totalDids"], 3);
    assert_eq!(data["recentLogs"].as_array().unwrap().len(), 10);
    assert!(data["lastSync"].is_string());
}

#[tokio::test]
async fn test_status_reports_agent_failure() {
    let server = spawn_with_agent(FailingAgent("agent unreachable".to_string())).await;

    server
        .post("/api/did/create", &json!({ "method": "auto" }))
        .await;

    let (_, body) = server.get("/api/status").await;
    assert_eq!(body["data"]["agentConnected"], false);
    assert_eq!(body["data"]["syncActive"], false);
    assert_eq!(body["data"]["storeOnline"], true);
}

#[tokio::test]
async fn test_sqlite_backend() {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    let state = AppState::new(Registry::from(store), StubAgent::new());
    let server = spawn_state(state).await;

    let (status, created) = server
        .post(
            "/api/did/create",
            &json!({ "method": "auto", "didMethod": "ion", "syncInterval": "30s" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, dids) = server.get("/api/dids").await;
    assert_eq!(dids["data"], json!([created["data"]["did"]]));

    let (_, body) = server.get("/api/status").await;
    assert_eq!(body["data"]["backend"], "sqlite");
    assert_eq!(body["data"]["totalDids"], 1);
}

#[tokio::test]
async fn test_status_reports_store_failure() {
    let store = FaultyStore::failing_reads(MemoryStore::new());
    let state = AppState::new(Registry::from(store), StubAgent::new());
    let server = spawn_state(state).await;

    let (status, body) = server.get("/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["storeOnline"], false);
    assert_eq!(body["data"]["totalDids"], 0);
    assert_eq!(body["data"]["recentLogs"], json!([]));
}

#[tokio::test]
async fn test_dashboard() {
    let server = spawn_server().await;

    let res = server.client.get(&server.url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let content_type = res.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let body = res.text().await.unwrap();
    assert!(body.contains("/api/did/create"));
    assert!(body.contains("/api/logs"));
}
