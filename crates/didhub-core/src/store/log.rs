use async_trait::async_trait;

use crate::model::{LogEntry, NewLogEntry};

use super::StoreError;

/// Append-only system log.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn append_log(&self, new: NewLogEntry) -> Result<LogEntry, StoreError>;

    /// Up to `limit` entries, newest first.
    async fn logs(&self, limit: usize) -> Result<Vec<LogEntry>, StoreError>;

    /// Removes every entry.
    async fn clear_logs(&self) -> Result<(), StoreError>;
}
