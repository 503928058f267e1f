//! Test helpers shared across the didhub workspace.
//!
//! - [conformance]: a backend-agnostic suite every [Backend](didhub_core::store::Backend)
//!   must pass.
//! - [agent]: deterministic identity agents for handler tests.
//! - [store]: a backend wrapper that injects storage failures.

pub mod agent;
pub mod conformance;
pub mod store;
