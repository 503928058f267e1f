use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Identifier, NewIdentifier};

use super::StoreError;

#[async_trait]
pub trait IdentifierStore: Send + Sync {
    /// Inserts a new identifier.
    /// Fails with [StoreError::Duplicate] if the DID is already stored.
    async fn insert_identifier(&self, new: NewIdentifier) -> Result<Identifier, StoreError>;

    async fn identifier(&self, id: Uuid) -> Result<Option<Identifier>, StoreError>;

    async fn identifier_by_did(&self, did: &str) -> Result<Option<Identifier>, StoreError>;

    /// All identifiers, newest created first.
    async fn identifiers(&self) -> Result<Vec<Identifier>, StoreError>;

    async fn identifier_count(&self) -> Result<usize, StoreError>;
}
