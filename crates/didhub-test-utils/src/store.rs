use async_trait::async_trait;
use didhub_core::{
    model::{
        Identifier, LogEntry, NewIdentifier, NewLogEntry, NewResolution, ResolutionRecord,
    },
    store::{Backend, IdentifierStore, LogStore, ResolutionStore, StoreError},
};
use uuid::Uuid;

/// Wraps a backend, failing reads or writes with [StoreError::BackendError].
///
/// Keep a clone of `inner` to inspect what was actually stored.
#[derive(Clone)]
pub struct FaultyStore<B> {
    pub inner: B,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl<B> FaultyStore<B> {
    pub fn failing_reads(inner: B) -> Self {
        Self {
            inner,
            fail_reads: true,
            fail_writes: false,
        }
    }

    pub fn failing_writes(inner: B) -> Self {
        Self {
            inner,
            fail_reads: false,
            fail_writes: true,
        }
    }

    fn read(&self) -> Result<(), StoreError> {
        if self.fail_reads {
            Err(StoreError::BackendError("read failed".to_string()))
        } else {
            Ok(())
        }
    }

    fn write(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            Err(StoreError::BackendError("write failed".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<B: Backend> IdentifierStore for FaultyStore<B> {
    async fn insert_identifier(&self, new: NewIdentifier) -> Result<Identifier, StoreError> {
        self.write()?;
        self.inner.insert_identifier(new).await
    }

    async fn identifier(&self, id: Uuid) -> Result<Option<Identifier>, StoreError> {
        self.read()?;
        self.inner.identifier(id).await
    }

    async fn identifier_by_did(&self, did: &str) -> Result<Option<Identifier>, StoreError> {
        self.read()?;
        self.inner.identifier_by_did(did).await
    }

    async fn identifiers(&self) -> Result<Vec<Identifier>, StoreError> {
        self.read()?;
        self.inner.identifiers().await
    }

    async fn identifier_count(&self) -> Result<usize, StoreError> {
        self.read()?;
        self.inner.identifier_count().await
    }
}

#[async_trait]
impl<B: Backend> ResolutionStore for FaultyStore<B> {
    async fn insert_resolution(&self, new: NewResolution) -> Result<ResolutionRecord, StoreError> {
        self.write()?;
        self.inner.insert_resolution(new).await
    }

    async fn latest_resolution(&self, did: &str) -> Result<Option<ResolutionRecord>, StoreError> {
        self.read()?;
        self.inner.latest_resolution(did).await
    }

    async fn resolutions(&self) -> Result<Vec<ResolutionRecord>, StoreError> {
        self.read()?;
        self.inner.resolutions().await
    }

    async fn resolution_count(&self) -> Result<usize, StoreError> {
        self.read()?;
        self.inner.resolution_count().await
    }
}

#[async_trait]
impl<B: Backend> LogStore for FaultyStore<B> {
    async fn append_log(&self, new: NewLogEntry) -> Result<LogEntry, StoreError> {
        self.write()?;
        self.inner.append_log(new).await
    }

    async fn logs(&self, limit: usize) -> Result<Vec<LogEntry>, StoreError> {
        self.read()?;
        self.inner.logs(limit).await
    }

    async fn clear_logs(&self) -> Result<(), StoreError> {
        self.write()?;
        self.inner.clear_logs().await
    }
}

impl<B: Backend> Backend for FaultyStore<B> {
    fn kind(&self) -> &'static str {
        self.inner.kind()
    }
}
