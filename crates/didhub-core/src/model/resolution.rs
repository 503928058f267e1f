use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// One attempt to resolve a DID to its document.
///
/// The DID does not have to belong to a stored [Identifier](super::Identifier).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionRecord {
    pub id: Uuid,
    pub did: String,
    /// Present if and only if `success` is true.
    pub document: Option<Value>,
    pub success: bool,
    pub error: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub resolved_at: OffsetDateTime,
}

/// The result of a resolution attempt, as reported by the identity agent.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Resolved(Value),
    Failed(String),
}

/// Input for [ResolutionStore::insert_resolution](crate::store::ResolutionStore::insert_resolution).
#[derive(Debug, Clone, PartialEq)]
pub struct NewResolution {
    pub did: String,
    pub outcome: ResolutionOutcome,
}

impl NewResolution {
    pub fn new(did: impl Into<String>, outcome: ResolutionOutcome) -> Self {
        Self {
            did: did.into(),
            outcome,
        }
    }

    /// Stamps the input with a fresh id and the current time.
    pub fn into_record(self) -> ResolutionRecord {
        let (document, success, error) = match self.outcome {
            ResolutionOutcome::Resolved(document) => (Some(document), true, None),
            ResolutionOutcome::Failed(error) => (None, false, Some(error)),
        };

        ResolutionRecord {
            id: Uuid::new_v4(),
            did: self.did,
            document,
            success,
            error,
            resolved_at: OffsetDateTime::now_utc(),
        }
    }
}
