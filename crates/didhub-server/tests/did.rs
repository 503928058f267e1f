use std::{collections::HashSet, time::Duration};

use didhub_core::{Registry, agent::AgentError};
use didhub_memory::MemoryStore;
use didhub_server::AppState;
use didhub_test_utils::agent::{FailingAgent, SlowAgent, StubAgent};
use reqwest::StatusCode;
use serde_json::json;

mod utils;

use utils::{spawn_server, spawn_state, spawn_with_agent};

#[tokio::test]
async fn test_create_did() {
    let server = spawn_server().await;

    let (status, body) = server
        .post(
            "/api/did/create",
            &json!({
                "method": "auto",
                "didMethod": "dht",
                "syncInterval": "2m",
                "keyStored": true,
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["connected"], true);

    let did = body["data"]["did"]["did"].as_str().unwrap().to_string();
    assert!(did.starts_with("did:stub:"));
    assert_eq!(body["data"]["did"]["method"], "dht");
    assert_eq!(body["data"]["did"]["syncInterval"], "2m");
    assert_eq!(body["data"]["did"]["keyStored"], true);
    assert_eq!(body["data"]["document"], StubAgent::document(&did));
    assert_eq!(body["data"]["did"]["document"], StubAgent::document(&did));

    let (_, logs) = server.get("/api/logs").await;
    let logs = logs["data"].as_array().unwrap();
    assert!(
        logs.iter()
            .any(|l| l["level"] == "SUCCESS" && l["message"].as_str().unwrap().contains(&did))
    );

    let messages = server.log_messages().await;
    assert_eq!(
        messages,
        vec![
            "DID document generated and stored".to_string(),
            format!("DID created: {}", did),
            "Identity agent connection established".to_string(),
            "Connecting to identity agent".to_string(),
            "DID creation request received".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_create_then_get() {
    let server = spawn_server().await;

    let (_, created) = server
        .post("/api/did/create", &json!({ "method": "auto" }))
        .await;
    let id = created["data"]["did"]["id"].as_str().unwrap();

    let (status, body) = server.get(&format!("/api/did/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], created["data"]["did"]);

    let (status, body) = server.get("/api/dids").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([created["data"]["did"]]));
}

#[tokio::test]
async fn test_get_unknown_did() {
    let server = spawn_server().await;

    let (status, body) = server
        .get("/api/did/7d4c6f8e-3a71-4c47-9a4e-0f1b5e9c2d10")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "DID not found" }));

    let (status, _) = server.get("/api/did/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_connection_methods() {
    let agent = StubAgent::new();
    let registry = Registry::from(MemoryStore::new());
    let state =
        AppState::new(registry, agent.clone()).with_community_dwn("https://community.example.com");
    let server = spawn_state(state).await;

    let (status, _) = server
        .post(
            "/api/did/create",
            &json!({
                "method": "custom",
                "syncInterval": "off",
                "keyStored": false,
                "dwnEndpoints": ["https://dwn.example.com"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .post("/api/did/create", &json!({ "method": "community" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["did"]["dwnEndpoints"], json!(null));

    let connections = agent.connections();
    assert_eq!(connections.len(), 2);
    assert_eq!(connections[0].dwn_endpoints, vec!["https://dwn.example.com"]);
    assert!(!connections[0].key_stored);
    assert!(!connections[0].sync.is_enabled());
    assert_eq!(
        connections[1].dwn_endpoints,
        vec!["https://community.example.com"]
    );
}

#[tokio::test]
async fn test_create_validation() {
    let server = spawn_server().await;

    let invalid = [
        json!({}),
        json!({ "method": "manual" }),
        json!({ "method": "auto", "didMethod": "web" }),
        json!({ "method": "auto", "syncInterval": "10m" }),
        json!({ "method": "custom", "dwnEndpoints": ["not a url"] }),
    ];

    for body in invalid {
        let (status, res) = server.post("/api/did/create", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(res["success"], false);
        assert!(res["error"].is_string());
    }

    let res = server
        .client
        .post(format!("{}/api/did/create", server.url))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    // Rejected before reaching the agent or the store.
    assert!(server.log_messages().await.is_empty());
    let (_, dids) = server.get("/api/dids").await;
    assert_eq!(dids["data"], json!([]));
}

#[tokio::test]
async fn test_create_agent_failure() {
    let server = spawn_with_agent(FailingAgent("agent unreachable".to_string())).await;

    let (status, body) = server
        .post("/api/did/create", &json!({ "method": "auto" }))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("agent unreachable"));

    let (_, logs) = server.get("/api/logs?limit=1").await;
    assert_eq!(logs["data"][0]["level"], "ERROR");
    assert_eq!(logs["data"][0]["message"], "DID creation failed");
    assert!(
        logs["data"][0]["data"]["error"]
            .as_str()
            .unwrap()
            .contains("agent unreachable")
    );

    let (_, dids) = server.get("/api/dids").await;
    assert_eq!(dids["data"], json!([]));
}

#[tokio::test]
async fn test_create_agent_timeout() {
    let agent = SlowAgent {
        delay: Duration::from_secs(5),
        inner: StubAgent::new(),
    };
    let registry = Registry::from(MemoryStore::new());
    let state = AppState::new(registry, agent).with_agent_timeout(Duration::from_millis(100));
    let server = spawn_state(state).await;

    let (status, body) = server
        .post("/api/did/create", &json!({ "method": "auto" }))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        AgentError::Timeout(Duration::from_millis(100)).to_string()
    );
}

#[tokio::test]
async fn test_concurrent_creates() {
    let server = spawn_server().await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let client = server.client.clone();
        let url = format!("{}/api/did/create", server.url);

        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({ "method": "auto" }))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let (_, body) = server.get("/api/dids").await;
    let dids = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["did"].as_str().unwrap().to_string())
        .collect::<HashSet<_>>();
    assert_eq!(dids.len(), 10);
}

#[tokio::test]
async fn test_unknown_route() {
    let server = spawn_server().await;

    let (status, body) = server.get("/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
