use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    model::{
        Identifier, LogEntry, LogLevel, NewIdentifier, NewLogEntry, NewResolution,
        ResolutionOutcome, ResolutionRecord,
    },
    store::{Backend, StoreError},
};

/// Number of log entries returned when no limit is given.
pub const DEFAULT_LOG_LIMIT: usize = 100;

/// Single point of truth for all persisted state.
///
/// Wraps a [Backend] and performs every read and write the rest of the system
/// needs. Identifier creation and resolution recording append a log entry as a
/// side effect. That entry is written separately: if it cannot be stored the
/// primary write is kept and the failure is only reported through `tracing`.
#[derive(Clone)]
pub struct Registry {
    backend: Arc<dyn Backend>,
}

impl<T: Backend + 'static> From<T> for Registry {
    fn from(backend: T) -> Self {
        Self::new(Arc::new(backend))
    }
}

impl Registry {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Name of the active backend.
    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    pub async fn create_identifier(&self, new: NewIdentifier) -> Result<Identifier, StoreError> {
        let identifier = self.backend.insert_identifier(new).await?;

        self.emit(
            LogLevel::Success,
            format!("DID created: {}", identifier.did),
            Some(json!({
                "didId": identifier.id,
                "method": identifier.method,
            })),
        )
        .await;

        Ok(identifier)
    }

    pub async fn identifier(&self, id: Uuid) -> Result<Option<Identifier>, StoreError> {
        self.backend.identifier(id).await
    }

    pub async fn identifier_by_did(&self, did: &str) -> Result<Option<Identifier>, StoreError> {
        self.backend.identifier_by_did(did).await
    }

    /// All identifiers, newest created first.
    pub async fn identifiers(&self) -> Result<Vec<Identifier>, StoreError> {
        self.backend.identifiers().await
    }

    pub async fn identifier_count(&self) -> Result<usize, StoreError> {
        self.backend.identifier_count().await
    }

    /// Stores the outcome of a resolution attempt.
    /// Successful attempts are logged as `SUCCESS`, failed ones as `ERROR`.
    pub async fn record_resolution(
        &self,
        did: impl Into<String>,
        outcome: ResolutionOutcome,
    ) -> Result<ResolutionRecord, StoreError> {
        let record = self
            .backend
            .insert_resolution(NewResolution::new(did, outcome))
            .await?;

        let (level, message) = if record.success {
            (LogLevel::Success, format!("DID resolved: {}", record.did))
        } else {
            (
                LogLevel::Error,
                format!("DID resolution failed: {}", record.did),
            )
        };

        self.emit(
            level,
            message,
            Some(json!({
                "resolutionId": record.id,
                "error": record.error,
            })),
        )
        .await;

        Ok(record)
    }

    pub async fn latest_resolution(
        &self,
        did: &str,
    ) -> Result<Option<ResolutionRecord>, StoreError> {
        self.backend.latest_resolution(did).await
    }

    /// All resolution attempts, newest first.
    pub async fn resolutions(&self) -> Result<Vec<ResolutionRecord>, StoreError> {
        self.backend.resolutions().await
    }

    pub async fn resolution_count(&self) -> Result<usize, StoreError> {
        self.backend.resolution_count().await
    }

    /// Appends an entry to the system log.
    pub async fn log(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Result<LogEntry, StoreError> {
        let entry = self
            .backend
            .append_log(NewLogEntry::new(level, message, data))
            .await?;

        match entry.level {
            LogLevel::Error => error!("{}", entry.message),
            LogLevel::Debug => debug!("{}", entry.message),
            LogLevel::Info | LogLevel::Success => info!("{}", entry.message),
        }

        Ok(entry)
    }

    /// Like [Registry::log], but a failure to store the entry is only warned about.
    pub async fn emit(&self, level: LogLevel, message: impl Into<String>, data: Option<Value>) {
        let message = message.into();

        if let Err(e) = self.log(level, message.clone(), data).await {
            warn!("Failed to store log entry {:?}: {}", message, e);
        }
    }

    /// Up to `limit` log entries, newest first. Defaults to [DEFAULT_LOG_LIMIT].
    pub async fn logs(&self, limit: Option<usize>) -> Result<Vec<LogEntry>, StoreError> {
        self.backend
            .logs(limit.unwrap_or(DEFAULT_LOG_LIMIT))
            .await
    }

    pub async fn clear_logs(&self) -> Result<(), StoreError> {
        self.backend.clear_logs().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        model::DidMethod,
        store::{IdentifierStore, LogStore, ResolutionStore},
    };

    /// Keeps identifiers and resolutions, but refuses every log write.
    #[derive(Default)]
    struct BrokenLog {
        identifiers: Mutex<Vec<Identifier>>,
        resolutions: Mutex<Vec<ResolutionRecord>>,
    }

    #[async_trait]
    impl IdentifierStore for BrokenLog {
        async fn insert_identifier(&self, new: NewIdentifier) -> Result<Identifier, StoreError> {
            let identifier = new.into_identifier();
            self.identifiers.lock().unwrap().push(identifier.clone());
            Ok(identifier)
        }

        async fn identifier(&self, id: Uuid) -> Result<Option<Identifier>, StoreError> {
            let found = self.identifiers.lock().unwrap();
            Ok(found.iter().find(|i| i.id == id).cloned())
        }

        async fn identifier_by_did(&self, did: &str) -> Result<Option<Identifier>, StoreError> {
            let found = self.identifiers.lock().unwrap();
            Ok(found.iter().find(|i| i.did == did).cloned())
        }

        async fn identifiers(&self) -> Result<Vec<Identifier>, StoreError> {
            Ok(self.identifiers.lock().unwrap().clone())
        }

        async fn identifier_count(&self) -> Result<usize, StoreError> {
            Ok(self.identifiers.lock().unwrap().len())
        }
    }

    #[async_trait]
    impl ResolutionStore for BrokenLog {
        async fn insert_resolution(
            &self,
            new: NewResolution,
        ) -> Result<ResolutionRecord, StoreError> {
            let record = new.into_record();
            self.resolutions.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn latest_resolution(
            &self,
            did: &str,
        ) -> Result<Option<ResolutionRecord>, StoreError> {
            let found = self.resolutions.lock().unwrap();
            Ok(found.iter().rev().find(|r| r.did == did).cloned())
        }

        async fn resolutions(&self) -> Result<Vec<ResolutionRecord>, StoreError> {
            Ok(self.resolutions.lock().unwrap().clone())
        }

        async fn resolution_count(&self) -> Result<usize, StoreError> {
            Ok(self.resolutions.lock().unwrap().len())
        }
    }

    #[async_trait]
    impl LogStore for BrokenLog {
        async fn append_log(&self, _: NewLogEntry) -> Result<LogEntry, StoreError> {
            Err(StoreError::BackendError("log table unavailable".to_string()))
        }

        async fn logs(&self, _: usize) -> Result<Vec<LogEntry>, StoreError> {
            Err(StoreError::BackendError("log table unavailable".to_string()))
        }

        async fn clear_logs(&self) -> Result<(), StoreError> {
            Err(StoreError::BackendError("log table unavailable".to_string()))
        }
    }

    impl Backend for BrokenLog {
        fn kind(&self) -> &'static str {
            "broken-log"
        }
    }

    #[tokio::test]
    async fn test_log_failure_keeps_identifier() {
        let registry = Registry::from(BrokenLog::default());

        let created = registry
            .create_identifier(NewIdentifier {
                did: "did:example:kept".to_string(),
                method: DidMethod::Jwk,
                document: json!({}),
                key_stored: false,
                sync_interval: None,
                dwn_endpoints: None,
            })
            .await
            .unwrap();

        let found = registry
            .identifier_by_did("did:example:kept")
            .await
            .unwrap();
        assert_eq!(found, Some(created));
        assert_eq!(registry.backend_kind(), "broken-log");
    }

    #[tokio::test]
    async fn test_log_failure_keeps_resolution() {
        let registry = Registry::from(BrokenLog::default());

        let record = registry
            .record_resolution(
                "did:example:gone",
                ResolutionOutcome::Failed("unsupported method".to_string()),
            )
            .await
            .unwrap();
        assert!(!record.success);

        let latest = registry
            .latest_resolution("did:example:gone")
            .await
            .unwrap();
        assert_eq!(latest, Some(record));
    }

    #[tokio::test]
    async fn test_log_failure_surfaces_on_direct_log() {
        let registry = Registry::from(BrokenLog::default());

        let err = registry
            .log(LogLevel::Info, "hello", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::BackendError(_)));
    }
}
