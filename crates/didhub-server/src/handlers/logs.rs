use axum::extract::{Query, State, rejection::QueryRejection};
use didhub_core::model::LogEntry;
use serde::Deserialize;

use crate::{
    AppState,
    envelope::{ApiError, Envelope},
};

#[derive(Deserialize, Debug, Default)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

pub async fn list_logs(
    State(state): State<AppState>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Envelope<Vec<LogEntry>>, ApiError> {
    let Query(query) = query?;
    Ok(Envelope::ok(state.registry.logs(query.limit).await?))
}

pub async fn clear_logs(State(state): State<AppState>) -> Result<Envelope, ApiError> {
    state.registry.clear_logs().await?;
    Ok(Envelope::message("Logs cleared successfully"))
}
