mod identifier;
mod log;
mod resolution;

pub use identifier::*;
pub use log::*;
pub use resolution::*;

use thiserror::Error;

/// Returned when a stored or submitted string does not name a known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseVariantError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
