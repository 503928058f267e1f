//! DID registry HTTP server, using [axum](https://github.com/tokio-rs/axum).
//!
//! Creates DIDs through an [IdentityAgent](didhub_core::agent::IdentityAgent),
//! stores them in a [Registry](didhub_core::Registry), and serves a small
//! dashboard on `/`.
//!
//! ## API
//!
//! Every response body is an [Envelope]: `{ success, data?, error?, message? }`.
//! Failures use HTTP status codes: 400 for invalid input, 404 for unknown
//! records, 409 for duplicate DIDs, and 500 for agent or store failures.

use axum::{
    Router,
    routing::{get, post},
};

pub mod agent;
pub mod config;
pub mod envelope;
pub mod handlers;
pub mod request;
pub mod state;

pub use envelope::{ApiError, Envelope};
pub use state::AppState;

use handlers::{dashboard, did, logs, resolution, status};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/api/did/create", post(did::create_did))
        .route("/api/did/resolve", post(did::resolve_did))
        .route("/api/did/:id", get(did::get_did))
        .route("/api/dids", get(did::list_dids))
        .route("/api/resolutions", get(resolution::list_resolutions))
        .route("/api/resolutions/:did", get(resolution::get_resolution))
        .route("/api/status", get(status::get_status))
        .route("/api/logs", get(logs::list_logs).delete(logs::clear_logs))
        .fallback(handlers::not_found)
        .with_state(state)
}
