use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use skyfolio_model::{MediaId, MediaRecord, MediaType};
use tracing::debug;

use crate::database::ports::media_records::MediaRecordStore;
use crate::error::{StoreError, StoreResult};

/// Process-local record store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryMediaStore {
    records: DashMap<MediaId, MediaRecord>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl MediaRecordStore for InMemoryMediaStore {
    async fn insert(&self, record: MediaRecord) -> StoreResult<()> {
        match self.records.entry(record.id) {
            Entry::Occupied(_) => Err(StoreError::Conflict(record.id)),
            Entry::Vacant(slot) => {
                debug!(id = %record.id, "media record inserted");
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn get(&self, id: MediaId) -> StoreResult<Option<MediaRecord>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list(
        &self,
        media_type: Option<MediaType>,
    ) -> StoreResult<Vec<MediaRecord>> {
        let mut records: Vec<MediaRecord> = self
            .records
            .iter()
            .filter(|entry| media_type.is_none_or(|t| entry.media_type == t))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    async fn remove(&self, id: MediaId) -> StoreResult<Option<MediaRecord>> {
        Ok(self.records.remove(&id).map(|(_, record)| record))
    }
}
