//! Row types, as stored in the database.

use std::str::FromStr;

use didhub_core::{
    model::{DidMethod, Identifier, LogEntry, LogLevel, ResolutionRecord, SyncInterval},
    store::StoreError,
};
use serde_json::Value;
use sqlx::{FromRow, types::Json};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(FromRow)]
pub struct IdentifierRow {
    pub id: String,
    pub did: String,
    pub method: String,
    pub document: Json<Value>,
    pub key_stored: bool,
    pub sync_interval: Option<String>,
    pub dwn_endpoints: Option<Json<Vec<String>>>,
    pub created_at: i64,
}

impl TryFrom<IdentifierRow> for Identifier {
    type Error = StoreError;

    fn try_from(row: IdentifierRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&row.id)?,
            did: row.did,
            method: DidMethod::from_str(&row.method)
                .map_err(|e| StoreError::BackendError(e.to_string()))?,
            document: row.document.0,
            key_stored: row.key_stored,
            sync_interval: row
                .sync_interval
                .as_deref()
                .map(SyncInterval::from_str)
                .transpose()
                .map_err(|e| StoreError::BackendError(e.to_string()))?,
            dwn_endpoints: row.dwn_endpoints.map(|e| e.0),
            created_at: from_nanos(row.created_at)?,
        })
    }
}

#[derive(FromRow)]
pub struct ResolutionRow {
    pub id: String,
    pub did: String,
    pub document: Option<Json<Value>>,
    pub success: bool,
    pub error: Option<String>,
    pub resolved_at: i64,
}

impl TryFrom<ResolutionRow> for ResolutionRecord {
    type Error = StoreError;

    fn try_from(row: ResolutionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&row.id)?,
            did: row.did,
            document: row.document.map(|d| d.0),
            success: row.success,
            error: row.error,
            resolved_at: from_nanos(row.resolved_at)?,
        })
    }
}

#[derive(FromRow)]
pub struct LogRow {
    pub id: String,
    pub level: String,
    pub message: String,
    pub data: Option<Json<Value>>,
    pub timestamp: i64,
}

impl TryFrom<LogRow> for LogEntry {
    type Error = StoreError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&row.id)?,
            level: LogLevel::from_str(&row.level)
                .map_err(|e| StoreError::BackendError(e.to_string()))?,
            message: row.message,
            data: row.data.map(|d| d.0),
            timestamp: from_nanos(row.timestamp)?,
        })
    }
}

/// Converts rows, failing on the first one that does not decode.
pub fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Timestamps are stored as unix nanoseconds.
pub fn to_nanos(ts: OffsetDateTime) -> Result<i64, StoreError> {
    i64::try_from(ts.unix_timestamp_nanos())
        .map_err(|_| StoreError::InvalidInput(format!("timestamp out of range: {}", ts)))
}

/// Row counts come back as `i64`.
pub fn from_count(count: i64) -> Result<usize, StoreError> {
    usize::try_from(count).map_err(|e| StoreError::BackendError(e.to_string()))
}

fn from_nanos(nanos: i64) -> Result<OffsetDateTime, StoreError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
        .map_err(|e| StoreError::BackendError(e.to_string()))
}

fn parse_uuid(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|e| StoreError::BackendError(format!("invalid id {}: {}", id, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanos_round_trip() {
        let now = OffsetDateTime::now_utc();
        let nanos = to_nanos(now).unwrap();
        assert_eq!(from_nanos(nanos).unwrap(), now);
    }

    #[test]
    fn test_unknown_level_is_backend_error() {
        let row = LogRow {
            id: Uuid::new_v4().to_string(),
            level: "TRACE".to_string(),
            message: "hello".to_string(),
            data: None,
            timestamp: 0,
        };

        let err = LogEntry::try_from(row).unwrap_err();
        assert!(matches!(err, StoreError::BackendError(_)));
    }

    #[test]
    fn test_bad_id_is_backend_error() {
        let row = ResolutionRow {
            id: "not-a-uuid".to_string(),
            did: "did:example:123".to_string(),
            document: None,
            success: false,
            error: Some("not found".to_string()),
            resolved_at: 0,
        };

        let err = ResolutionRecord::try_from(row).unwrap_err();
        assert!(matches!(err, StoreError::BackendError(_)));
    }
}
