use std::{sync::Arc, time::Duration};

use didhub_core::{Registry, agent::IdentityAgent};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::config::{DEFAULT_AGENT_TIMEOUT, DEFAULT_COMMUNITY_DWN};

#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub agent: Arc<dyn IdentityAgent>,
    /// Upper bound on each identity agent call.
    pub agent_timeout: Duration,
    /// Endpoint used for `community` connections.
    pub community_dwn: String,
    pub agent_status: AgentStatus,
}

impl AppState {
    pub fn new(registry: Registry, agent: impl IdentityAgent + 'static) -> Self {
        Self {
            registry,
            agent: Arc::new(agent),
            agent_timeout: DEFAULT_AGENT_TIMEOUT,
            community_dwn: DEFAULT_COMMUNITY_DWN.to_string(),
            agent_status: AgentStatus::default(),
        }
    }

    pub fn with_agent_timeout(mut self, agent_timeout: Duration) -> Self {
        self.agent_timeout = agent_timeout;
        self
    }

    pub fn with_community_dwn(mut self, community_dwn: impl Into<String>) -> Self {
        self.community_dwn = community_dwn.into();
        self
    }
}

/// Tracks how recent identity agent calls went.
#[derive(Clone, Default)]
pub struct AgentStatus(Arc<RwLock<AgentHealth>>);

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct AgentHealth {
    pub last_success: Option<OffsetDateTime>,
    pub last_failure: Option<OffsetDateTime>,
}

impl AgentHealth {
    /// True unless the most recent call failed.
    pub fn connected(&self) -> bool {
        match (self.last_success, self.last_failure) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(success), Some(failure)) => success > failure,
        }
    }
}

impl AgentStatus {
    pub async fn record(&self, ok: bool) {
        let now = OffsetDateTime::now_utc();
        let mut health = self.0.write().await;

        if ok {
            health.last_success = Some(now);
        } else {
            health.last_failure = Some(now);
        }
    }

    pub async fn health(&self) -> AgentHealth {
        *self.0.read().await
    }
}
