use axum::extract::State;
use didhub_core::model::LogEntry;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;

use crate::{AppState, envelope::Envelope};

/// Number of log entries included in the status.
pub const RECENT_LOGS: usize = 10;

pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// False if the most recent identity agent call failed.
    pub agent_connected: bool,
    /// False if any store query made for this status failed.
    pub store_online: bool,
    pub sync_active: bool,
    pub backend: &'static str,
    pub server_version: &'static str,
    pub total_dids: usize,
    pub total_resolutions: usize,
    pub recent_logs: Vec<LogEntry>,
    /// Time of the last successful identity agent call.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_sync: Option<OffsetDateTime>,
}

/// Reports health instead of failing, so store errors still produce a status.
pub async fn get_status(State(state): State<AppState>) -> Envelope<Status> {
    let registry = &state.registry;
    let mut store_online = true;

    let total_dids = match registry.identifier_count().await {
        Ok(count) => count,
        Err(e) => {
            warn!("Failed to count identifiers: {}", e);
            store_online = false;
            0
        }
    };

    let total_resolutions = match registry.resolution_count().await {
        Ok(count) => count,
        Err(e) => {
            warn!("Failed to count resolutions: {}", e);
            store_online = false;
            0
        }
    };

    let recent_logs = match registry.logs(Some(RECENT_LOGS)).await {
        Ok(logs) => logs,
        Err(e) => {
            warn!("Failed to read recent logs: {}", e);
            store_online = false;
            Vec::new()
        }
    };

    let health = state.agent_status.health().await;

    Envelope::ok(Status {
        agent_connected: health.connected(),
        store_online,
        sync_active: health.connected(),
        backend: registry.backend_kind(),
        server_version: SERVER_VERSION,
        total_dids,
        total_resolutions,
        recent_logs,
        last_sync: health.last_success,
    })
}
