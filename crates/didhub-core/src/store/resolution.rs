use async_trait::async_trait;

use crate::model::{NewResolution, ResolutionRecord};

use super::StoreError;

#[async_trait]
pub trait ResolutionStore: Send + Sync {
    async fn insert_resolution(&self, new: NewResolution) -> Result<ResolutionRecord, StoreError>;

    /// The most recent resolution attempt for a DID.
    async fn latest_resolution(&self, did: &str) -> Result<Option<ResolutionRecord>, StoreError>;

    /// All resolution attempts, newest first.
    async fn resolutions(&self) -> Result<Vec<ResolutionRecord>, StoreError>;

    async fn resolution_count(&self) -> Result<usize, StoreError>;
}
