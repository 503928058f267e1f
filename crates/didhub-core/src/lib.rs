//! Core types for didhub.
//!
//! didhub keeps three kinds of records: [Identifier](model::Identifier)s created
//! through an identity agent, [ResolutionRecord](model::ResolutionRecord)s for every
//! resolution attempt, and a system log of [LogEntry](model::LogEntry)s.
//!
//! Storage backends implement the traits in [store]. The [Registry] wraps a backend
//! and is the only thing the rest of the system talks to; every write it performs
//! is reflected in the system log.

pub mod agent;
pub mod model;
pub mod registry;
pub mod store;

pub use registry::{DEFAULT_LOG_LIMIT, Registry};
