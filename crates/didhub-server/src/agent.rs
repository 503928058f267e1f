//! Identity agent backed by [xdid](https://crates.io/crates/xdid).

use std::{future::Future, str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use didhub_core::agent::{AgentError, AgentSession, ConnectOptions, IdentityAgent};
use serde_json::Value;
use tracing::debug;
use xdid::{
    core::did::Did,
    methods::key::{DidKeyPair, PublicKey, p256::P256KeyPair},
    resolver::{DidResolver, MethodError},
};

/// Creates a fresh P-256 `did:key` on every connect.
/// Resolves `did:key` locally and `did:web` over HTTPS.
#[derive(Clone)]
pub struct KeyAgent {
    resolver: Arc<DidResolver>,
}

impl KeyAgent {
    pub fn new() -> Result<Self, MethodError> {
        Ok(Self {
            resolver: Arc::new(DidResolver::new()?),
        })
    }
}

#[async_trait]
impl IdentityAgent for KeyAgent {
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn AgentSession>, AgentError> {
        let keys = P256KeyPair::generate();
        let did = keys.public().to_did().to_string();

        debug!(
            "generated {} (sync {}, {} endpoints)",
            did,
            options.sync,
            options.dwn_endpoints.len()
        );

        Ok(Box::new(KeySession {
            did,
            resolver: self.resolver.clone(),
        }))
    }
}

struct KeySession {
    did: String,
    resolver: Arc<DidResolver>,
}

#[async_trait]
impl AgentSession for KeySession {
    fn did(&self) -> &str {
        &self.did
    }

    async fn resolve(&self, did: &str) -> Result<Value, AgentError> {
        let parsed =
            Did::from_str(did).map_err(|_| AgentError::Resolve(format!("invalid DID: {}", did)))?;

        let document = self
            .resolver
            .resolve(&parsed)
            .await
            .map_err(|e| AgentError::Resolve(format!("{}: {}", did, e)))?;

        serde_json::to_value(&document).map_err(|e| AgentError::Resolve(e.to_string()))
    }
}

/// Bounds an agent call, failing with [AgentError::Timeout] once `limit` elapses.
pub async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, AgentError>>,
) -> Result<T, AgentError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AgentError::Timeout(limit))?
}
