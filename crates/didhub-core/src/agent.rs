//! The identity agent: an external capability that creates and resolves DIDs.
//!
//! didhub never generates keys or resolves DID methods itself. Both happen
//! behind [IdentityAgent], which the server calls with a bounded timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::SyncInterval;

/// Options passed to [IdentityAgent::connect].
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
    /// DWN endpoints the new identity should advertise.
    pub dwn_endpoints: Vec<String>,
    pub sync: SyncInterval,
    /// Whether the agent should leave private keys with a remote node.
    pub key_stored: bool,
}

#[async_trait]
pub trait IdentityAgent: Send + Sync {
    /// Connects to the agent, creating a new identity.
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn AgentSession>, AgentError>;
}

/// A connected identity.
#[async_trait]
pub trait AgentSession: Send + Sync {
    /// The DID of the connected identity.
    fn did(&self) -> &str;

    /// Resolves any DID to its document.
    async fn resolve(&self, did: &str) -> Result<Value, AgentError>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("failed to connect: {0}")]
    Connect(String),
    #[error("failed to resolve: {0}")]
    Resolve(String),
    #[error("identity agent timed out after {0:?}")]
    Timeout(Duration),
}
