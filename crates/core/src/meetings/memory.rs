use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::meeting::{MeetingKey, MeetingRecord, UserId};
use crate::meetings::store::{MeetingStore, StoreError};

/// In-memory meeting store. Backs processor tests and database-free local
/// runs; the mutex gives the same per-record atomicity the SQL store gets
/// from single-statement writes.
#[derive(Default)]
pub struct MemoryMeetingStore {
    records: Mutex<HashMap<MeetingKey, MeetingRecord>>,
}

impl MemoryMeetingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeetingStore for MemoryMeetingStore {
    async fn get(&self, key: &MeetingKey) -> Result<Option<MeetingRecord>, StoreError> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn insert(&self, record: &MeetingRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.key) {
            return Err(StoreError::Conflict);
        }
        records.insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn append_response(
        &self,
        key: &MeetingKey,
        participant: &UserId,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let record = records.get_mut(key).ok_or(StoreError::NotFound)?;
        Ok(record.responses.insert(participant.clone()))
    }

    async fn mark_finished(&self, key: &MeetingKey) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let record = records.get_mut(key).ok_or(StoreError::NotFound)?;
        record.finished = true;
        Ok(())
    }
}
