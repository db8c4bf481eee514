use async_trait::async_trait;
use skyfolio_model::{MediaId, MediaRecord, MediaType};

use crate::error::StoreResult;

/// Repository port for media records.
///
/// Adapters own durability; callers never assume anything beyond the
/// semantics of these four operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaRecordStore: Send + Sync {
    /// Fails with `Conflict` when the id is already present.
    async fn insert(&self, record: MediaRecord) -> StoreResult<()>;

    async fn get(&self, id: MediaId) -> StoreResult<Option<MediaRecord>>;

    /// Newest first, optionally restricted to one media type.
    async fn list(
        &self,
        media_type: Option<MediaType>,
    ) -> StoreResult<Vec<MediaRecord>>;

    /// Returns the removed record, or `None` when nothing was stored.
    async fn remove(&self, id: MediaId) -> StoreResult<Option<MediaRecord>>;
}
