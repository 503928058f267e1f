use async_trait::async_trait;
use didhub_core::{
    model::{NewResolution, ResolutionRecord},
    store::{ResolutionStore, StoreError},
};
use sqlx::types::Json;
use tracing::debug;

use crate::{
    SqliteStore,
    data::{ResolutionRow, decode_all, from_count, to_nanos},
};

#[async_trait]
impl ResolutionStore for SqliteStore {
    async fn insert_resolution(&self, new: NewResolution) -> Result<ResolutionRecord, StoreError> {
        let record = new.into_record();
        debug!("inserting resolution {} {}", record.id, record.did);

        sqlx::query(
            "INSERT INTO did_resolutions (id, did, document, success, error, resolved_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(&record.did)
        .bind(record.document.as_ref().map(Json))
        .bind(record.success)
        .bind(record.error.as_deref())
        .bind(to_nanos(record.resolved_at)?)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::BackendError(e.to_string()))?;

        Ok(record)
    }

    async fn latest_resolution(&self, did: &str) -> Result<Option<ResolutionRecord>, StoreError> {
        let row = sqlx::query_as::<_, ResolutionRow>(
            "SELECT * FROM did_resolutions WHERE did = ?
             ORDER BY resolved_at DESC, rowid DESC LIMIT 1",
        )
        .bind(did)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::BackendError(e.to_string()))?;

        row.map(ResolutionRecord::try_from).transpose()
    }

    async fn resolutions(&self) -> Result<Vec<ResolutionRecord>, StoreError> {
        let rows = sqlx::query_as::<_, ResolutionRow>(
            "SELECT * FROM did_resolutions ORDER BY resolved_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::BackendError(e.to_string()))?;

        decode_all(rows)
    }

    async fn resolution_count(&self) -> Result<usize, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM did_resolutions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))?;

        from_count(count)
    }
}
