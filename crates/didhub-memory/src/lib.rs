//! Volatile didhub backend, holding every record in process memory.
//!
//! All state sits behind one [RwLock]. Writes take the write guard for the
//! whole check-then-insert, so concurrent creations cannot lose updates or
//! slip past the DID uniqueness check.
//!
//! ## Retention
//!
//! Unlike the SQLite backend, the system log is capped: once `log_capacity`
//! entries are held, each append discards the oldest entry.

use std::{
    cmp::Reverse,
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use didhub_core::{
    model::{
        Identifier, LogEntry, NewIdentifier, NewLogEntry, NewResolution, ResolutionRecord,
    },
    store::{Backend, IdentifierStore, LogStore, ResolutionStore, StoreError},
};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Default maximum number of retained log entries.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

#[derive(Clone)]
pub struct MemoryStore(Arc<RwLock<State>>);

struct State {
    /// Insertion order.
    identifiers: Vec<Identifier>,
    by_did: HashMap<String, usize>,
    resolutions: Vec<ResolutionRecord>,
    logs: VecDeque<LogEntry>,
    log_capacity: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_log_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// Creates a store that keeps at most `log_capacity` log entries.
    /// A capacity of zero is treated as one.
    pub fn with_log_capacity(log_capacity: usize) -> Self {
        let log_capacity = log_capacity.max(1);

        Self(Arc::new(RwLock::new(State {
            identifiers: Vec::new(),
            by_did: HashMap::new(),
            resolutions: Vec::new(),
            logs: VecDeque::new(),
            log_capacity,
        })))
    }

    pub async fn log_capacity(&self) -> usize {
        self.0.read().await.log_capacity
    }
}

/// Reverses insertion order, then sorts by timestamp descending, matching the
/// SQLite `ORDER BY` on timestamp. An entry written after a clock step backwards
/// therefore lists after older entries. The sort is stable, keeping ties newest
/// first.
fn newest_first<'a, T: Clone + 'a, K: Ord>(
    items: impl DoubleEndedIterator<Item = &'a T>,
    key: impl Fn(&T) -> K,
) -> Vec<T> {
    let mut items = items.rev().cloned().collect::<Vec<_>>();
    items.sort_by_key(|item| Reverse(key(item)));
    items
}

#[async_trait]
impl IdentifierStore for MemoryStore {
    async fn insert_identifier(&self, new: NewIdentifier) -> Result<Identifier, StoreError> {
        let mut state = self.0.write().await;

        if state.by_did.contains_key(&new.did) {
            return Err(StoreError::Duplicate(new.did));
        }

        let identifier = new.into_identifier();
        debug!("inserting identifier {} {}", identifier.id, identifier.did);

        let index = state.identifiers.len();
        state.by_did.insert(identifier.did.clone(), index);
        state.identifiers.push(identifier.clone());

        Ok(identifier)
    }

    async fn identifier(&self, id: Uuid) -> Result<Option<Identifier>, StoreError> {
        let state = self.0.read().await;
        Ok(state.identifiers.iter().find(|i| i.id == id).cloned())
    }

    async fn identifier_by_did(&self, did: &str) -> Result<Option<Identifier>, StoreError> {
        let state = self.0.read().await;

        Ok(state
            .by_did
            .get(did)
            .and_then(|index| state.identifiers.get(*index))
            .cloned())
    }

    async fn identifiers(&self) -> Result<Vec<Identifier>, StoreError> {
        let state = self.0.read().await;
        Ok(newest_first(state.identifiers.iter(), |i| i.created_at))
    }

    async fn identifier_count(&self) -> Result<usize, StoreError> {
        Ok(self.0.read().await.identifiers.len())
    }
}

#[async_trait]
impl ResolutionStore for MemoryStore {
    async fn insert_resolution(&self, new: NewResolution) -> Result<ResolutionRecord, StoreError> {
        let mut state = self.0.write().await;

        let record = new.into_record();
        debug!("inserting resolution {} {}", record.id, record.did);

        state.resolutions.push(record.clone());

        Ok(record)
    }

    async fn latest_resolution(&self, did: &str) -> Result<Option<ResolutionRecord>, StoreError> {
        let state = self.0.read().await;

        Ok(state
            .resolutions
            .iter()
            .filter(|r| r.did == did)
            .max_by_key(|r| r.resolved_at)
            .cloned())
    }

    async fn resolutions(&self) -> Result<Vec<ResolutionRecord>, StoreError> {
        let state = self.0.read().await;
        Ok(newest_first(state.resolutions.iter(), |r| r.resolved_at))
    }

    async fn resolution_count(&self) -> Result<usize, StoreError> {
        Ok(self.0.read().await.resolutions.len())
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn append_log(&self, new: NewLogEntry) -> Result<LogEntry, StoreError> {
        let mut state = self.0.write().await;

        let entry = new.into_entry();

        while state.logs.len() >= state.log_capacity {
            state.logs.pop_front();
        }
        state.logs.push_back(entry.clone());

        Ok(entry)
    }

    async fn logs(&self, limit: usize) -> Result<Vec<LogEntry>, StoreError> {
        let state = self.0.read().await;

        let mut logs = newest_first(state.logs.iter(), |l| l.timestamp);
        logs.truncate(limit);

        Ok(logs)
    }

    async fn clear_logs(&self) -> Result<(), StoreError> {
        let mut state = self.0.write().await;
        debug!("clearing {} log entries", state.logs.len());
        state.logs.clear();
        Ok(())
    }
}

impl Backend for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }
}
