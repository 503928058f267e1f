#![allow(dead_code)]

use std::net::SocketAddr;

use didhub_core::{Registry, agent::IdentityAgent};
use didhub_memory::MemoryStore;
use didhub_server::{AppState, create_router};
use didhub_test_utils::agent::StubAgent;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;

pub struct TestServer {
    pub url: String,
    pub client: Client,
    pub registry: Registry,
}

impl TestServer {
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(format!("{}{}", self.url, path))
            .send()
            .await
            .unwrap();

        into_parts(res).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(format!("{}{}", self.url, path))
            .json(body)
            .send()
            .await
            .unwrap();

        into_parts(res).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .delete(format!("{}{}", self.url, path))
            .send()
            .await
            .unwrap();

        into_parts(res).await
    }

    /// Log messages, newest first.
    pub async fn log_messages(&self) -> Vec<String> {
        let (_, body) = self.get("/api/logs").await;

        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["message"].as_str().unwrap().to_string())
            .collect()
    }
}

async fn into_parts(res: Response) -> (StatusCode, Value) {
    let status = res.status();
    let body = res.json().await.unwrap();
    (status, body)
}

/// Serves a memory-backed registry with a [StubAgent].
pub async fn spawn_server() -> TestServer {
    spawn_with_agent(StubAgent::new()).await
}

pub async fn spawn_with_agent(agent: impl IdentityAgent + 'static) -> TestServer {
    let registry = Registry::from(MemoryStore::new());
    spawn_state(AppState::new(registry, agent)).await
}

/// Starts a server on a random open port.
pub async fn spawn_state(state: AppState) -> TestServer {
    let registry = state.registry.clone();
    let router = create_router(state);

    let port = port_check::free_local_port().unwrap();
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        url: format!("http://{}", addr),
        client: Client::new(),
        registry,
    }
}
