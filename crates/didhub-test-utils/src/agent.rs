use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use didhub_core::agent::{AgentError, AgentSession, ConnectOptions, IdentityAgent};
use serde_json::{Value, json};

/// Mints `did:stub:<n>` identities and resolves only the ones it minted.
#[derive(Clone, Default)]
pub struct StubAgent {
    minted: Arc<Mutex<HashSet<String>>>,
    counter: Arc<AtomicUsize>,
    connections: Arc<Mutex<Vec<ConnectOptions>>>,
}

impl StubAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options of every connect call so far.
    pub fn connections(&self) -> Vec<ConnectOptions> {
        self.connections.lock().unwrap().clone()
    }

    /// The document [StubAgent] resolves for a DID it minted.
    pub fn document(did: &str) -> Value {
        json!({
            "@context": ["https://www.w3.org/ns/did/v1"],
            "id": did,
            "verificationMethod": [],
        })
    }
}

#[async_trait]
impl IdentityAgent for StubAgent {
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn AgentSession>, AgentError> {
        self.connections.lock().unwrap().push(options.clone());

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let did = format!("did:stub:{}", n);
        self.minted.lock().unwrap().insert(did.clone());

        Ok(Box::new(StubSession {
            did,
            minted: self.minted.clone(),
        }))
    }
}

struct StubSession {
    did: String,
    minted: Arc<Mutex<HashSet<String>>>,
}

#[async_trait]
impl AgentSession for StubSession {
    fn did(&self) -> &str {
        &self.did
    }

    async fn resolve(&self, did: &str) -> Result<Value, AgentError> {
        if self.minted.lock().unwrap().contains(did) {
            Ok(StubAgent::document(did))
        } else {
            Err(AgentError::Resolve(format!("unable to resolve {}", did)))
        }
    }
}

/// Fails every connect call.
#[derive(Clone)]
pub struct FailingAgent(pub String);

#[async_trait]
impl IdentityAgent for FailingAgent {
    async fn connect(&self, _: &ConnectOptions) -> Result<Box<dyn AgentSession>, AgentError> {
        Err(AgentError::Connect(self.0.clone()))
    }
}

/// Sleeps before every connect call.
#[derive(Clone)]
pub struct SlowAgent {
    pub delay: Duration,
    pub inner: StubAgent,
}

#[async_trait]
impl IdentityAgent for SlowAgent {
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn AgentSession>, AgentError> {
        tokio::time::sleep(self.delay).await;
        self.inner.connect(options).await
    }
}
