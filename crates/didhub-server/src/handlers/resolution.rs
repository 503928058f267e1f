use axum::extract::{Path, State};
use didhub_core::model::ResolutionRecord;

use crate::{
    AppState,
    envelope::{ApiError, Envelope},
};

pub async fn list_resolutions(
    State(state): State<AppState>,
) -> Result<Envelope<Vec<ResolutionRecord>>, ApiError> {
    Ok(Envelope::ok(state.registry.resolutions().await?))
}

/// The most recent resolution attempt for a DID.
pub async fn get_resolution(
    State(state): State<AppState>,
    Path(did): Path<String>,
) -> Result<Envelope<ResolutionRecord>, ApiError> {
    state
        .registry
        .latest_resolution(&did)
        .await?
        .map(Envelope::ok)
        .ok_or(ApiError::NotFound("Resolution not found"))
}
