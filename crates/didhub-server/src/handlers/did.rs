use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use didhub_core::{
    agent::{AgentError, ConnectOptions},
    model::{Identifier, LogLevel, NewIdentifier, ResolutionOutcome, ResolutionRecord},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::{
    AppState,
    agent::with_timeout,
    envelope::{ApiError, Envelope},
    request::{CreateDidRequest, ResolveDidRequest},
};

#[derive(Serialize, Debug)]
pub struct CreatedDid {
    pub did: Identifier,
    pub document: Value,
    pub connected: bool,
}

#[derive(Serialize, Debug)]
pub struct ResolvedDid {
    pub resolution: ResolutionRecord,
    pub document: Value,
    /// Whether the DID belongs to a stored identifier.
    pub known: bool,
}

pub async fn create_did(
    State(state): State<AppState>,
    payload: Result<Json<CreateDidRequest>, JsonRejection>,
) -> Result<Envelope<CreatedDid>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    state
        .registry
        .emit(
            LogLevel::Debug,
            "DID creation request received",
            serde_json::to_value(&req).ok(),
        )
        .await;

    match create(&state, &req).await {
        Ok(created) => Ok(Envelope::ok(created)),
        Err(e) => {
            state
                .registry
                .emit(
                    LogLevel::Error,
                    "DID creation failed",
                    Some(json!({ "error": e.to_string() })),
                )
                .await;

            Err(e)
        }
    }
}

async fn create(state: &AppState, req: &CreateDidRequest) -> Result<CreatedDid, ApiError> {
    let options = req.connect_options(&state.community_dwn);

    state
        .registry
        .emit(
            LogLevel::Debug,
            "Connecting to identity agent",
            Some(json!({ "options": options })),
        )
        .await;

    let (did, document) = connect_and_resolve_self(state, &options).await?;

    state
        .registry
        .emit(
            LogLevel::Info,
            "Identity agent connection established",
            Some(json!({ "did": did })),
        )
        .await;

    let identifier = state
        .registry
        .create_identifier(NewIdentifier {
            did,
            method: req.did_method,
            document: document.clone(),
            key_stored: req.key_stored,
            sync_interval: Some(req.sync_interval),
            dwn_endpoints: req.dwn_endpoints.clone(),
        })
        .await?;

    state
        .registry
        .emit(
            LogLevel::Success,
            "DID document generated and stored",
            Some(json!({ "didId": identifier.id })),
        )
        .await;

    Ok(CreatedDid {
        did: identifier,
        document,
        connected: true,
    })
}

/// Connects a new identity and resolves its own document.
async fn connect_and_resolve_self(
    state: &AppState,
    options: &ConnectOptions,
) -> Result<(String, Value), AgentError> {
    let res: Result<_, AgentError> = async {
        let session = with_timeout(state.agent_timeout, state.agent.connect(options)).await?;
        let did = session.did().to_string();
        let document = with_timeout(state.agent_timeout, session.resolve(&did)).await?;
        Ok((did, document))
    }
    .await;

    state.agent_status.record(res.is_ok()).await;
    res
}

pub async fn resolve_did(
    State(state): State<AppState>,
    payload: Result<Json<ResolveDidRequest>, JsonRejection>,
) -> Result<Envelope<ResolvedDid>, ApiError> {
    let Json(req) = payload?;
    let did = req.validate()?;

    state
        .registry
        .emit(
            LogLevel::Debug,
            format!("DID resolution requested: {}", did),
            Some(json!({ "did": did })),
        )
        .await;

    match resolve(&state, did).await {
        Ok(document) => {
            let resolution = state
                .registry
                .record_resolution(did, ResolutionOutcome::Resolved(document.clone()))
                .await?;

            let known = match state.registry.identifier_by_did(did).await {
                Ok(found) => found.is_some(),
                Err(e) => {
                    warn!("Failed to look up {}: {}", did, e);
                    false
                }
            };

            Ok(Envelope::ok(ResolvedDid {
                resolution,
                document,
                known,
            }))
        }
        Err(e) => {
            // Best-effort: the agent error is returned either way.
            if let Err(store_err) = state
                .registry
                .record_resolution(did, ResolutionOutcome::Failed(e.to_string()))
                .await
            {
                warn!("Failed to record resolution of {}: {}", did, store_err);
            }

            Err(e.into())
        }
    }
}

async fn resolve(state: &AppState, did: &str) -> Result<Value, AgentError> {
    let res: Result<_, AgentError> = async {
        let session = with_timeout(
            state.agent_timeout,
            state.agent.connect(&ConnectOptions::default()),
        )
        .await?;

        with_timeout(state.agent_timeout, session.resolve(did)).await
    }
    .await;

    state.agent_status.record(res.is_ok()).await;
    res
}

pub async fn list_dids(
    State(state): State<AppState>,
) -> Result<Envelope<Vec<Identifier>>, ApiError> {
    Ok(Envelope::ok(state.registry.identifiers().await?))
}

pub async fn get_did(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<Identifier>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound("DID not found"))?;

    state
        .registry
        .identifier(id)
        .await?
        .map(Envelope::ok)
        .ok_or(ApiError::NotFound("DID not found"))
}
