use async_trait::async_trait;
use didhub_core::{
    model::{Identifier, NewIdentifier},
    store::{IdentifierStore, StoreError},
};
use sqlx::types::Json;
use tracing::debug;
use uuid::Uuid;

use crate::{
    SqliteStore,
    data::{IdentifierRow, decode_all, from_count, to_nanos},
};

#[async_trait]
impl IdentifierStore for SqliteStore {
    async fn insert_identifier(&self, new: NewIdentifier) -> Result<Identifier, StoreError> {
        let identifier = new.into_identifier();
        debug!("inserting identifier {} {}", identifier.id, identifier.did);

        sqlx::query(
            "INSERT INTO dids (id, did, method, document, key_stored, sync_interval, dwn_endpoints, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(identifier.id.to_string())
        .bind(&identifier.did)
        .bind(identifier.method.as_str())
        .bind(Json(&identifier.document))
        .bind(identifier.key_stored)
        .bind(identifier.sync_interval.map(|s| s.as_str()))
        .bind(identifier.dwn_endpoints.as_ref().map(Json))
        .bind(to_nanos(identifier.created_at)?)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(identifier.did.clone())
            }
            e => StoreError::BackendError(e.to_string()),
        })?;

        Ok(identifier)
    }

    async fn identifier(&self, id: Uuid) -> Result<Option<Identifier>, StoreError> {
        let row = sqlx::query_as::<_, IdentifierRow>("SELECT * FROM dids WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))?;

        row.map(Identifier::try_from).transpose()
    }

    async fn identifier_by_did(&self, did: &str) -> Result<Option<Identifier>, StoreError> {
        let row = sqlx::query_as::<_, IdentifierRow>("SELECT * FROM dids WHERE did = ?")
            .bind(did)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))?;

        row.map(Identifier::try_from).transpose()
    }

    async fn identifiers(&self) -> Result<Vec<Identifier>, StoreError> {
        let rows = sqlx::query_as::<_, IdentifierRow>(
            "SELECT * FROM dids ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::BackendError(e.to_string()))?;

        decode_all(rows)
    }

    async fn identifier_count(&self) -> Result<usize, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dids")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))?;

        from_count(count)
    }
}
