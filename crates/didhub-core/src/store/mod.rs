use thiserror::Error;

mod identifier;
mod log;
mod resolution;

pub use identifier::*;
pub use log::*;
pub use resolution::*;

#[derive(Error, Debug)]
pub enum StoreError {
    /// An identifier with this DID already exists.
    #[error("duplicate identifier: {0}")]
    Duplicate(String),
    #[error("backend error: {0}")]
    BackendError(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// A complete storage backend.
///
/// Implementations generate ids and timestamps on insert, and return every
/// listing newest first. Ties on timestamp are broken by insertion order.
pub trait Backend: IdentifierStore + ResolutionStore + LogStore {
    /// Short name of the backend, e.g. `"memory"`.
    fn kind(&self) -> &'static str;
}
