use async_trait::async_trait;
use didhub_core::{
    model::{LogEntry, NewLogEntry},
    store::{LogStore, StoreError},
};
use sqlx::types::Json;
use tracing::debug;

use crate::{
    SqliteStore,
    data::{LogRow, decode_all, to_nanos},
};

#[async_trait]
impl LogStore for SqliteStore {
    async fn append_log(&self, new: NewLogEntry) -> Result<LogEntry, StoreError> {
        let entry = new.into_entry();

        sqlx::query(
            "INSERT INTO system_logs (id, level, message, data, timestamp) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.level.as_str())
        .bind(&entry.message)
        .bind(entry.data.as_ref().map(Json))
        .bind(to_nanos(entry.timestamp)?)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::BackendError(e.to_string()))?;

        Ok(entry)
    }

    async fn logs(&self, limit: usize) -> Result<Vec<LogEntry>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, LogRow>(
            "SELECT * FROM system_logs ORDER BY timestamp DESC, rowid DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::BackendError(e.to_string()))?;

        decode_all(rows)
    }

    async fn clear_logs(&self) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM system_logs")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))?;

        debug!("cleared {} log entries", res.rows_affected());

        Ok(())
    }
}
