use async_trait::async_trait;
use thiserror::Error;

use crate::domain::meeting::{MeetingKey, MeetingRecord, UserId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("meeting not found")]
    NotFound,
    #[error("meeting identity already exists")]
    Conflict,
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Persistence port for meeting records, keyed by announcement identity.
///
/// `append_response` and `mark_finished` are the concurrency-control
/// boundary of the whole system: both must be atomic per record so that
/// concurrent acknowledgment handlers never lose a response and can call
/// `mark_finished` redundantly without harm. No application-level locking
/// sits above them.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    async fn get(&self, key: &MeetingKey) -> Result<Option<MeetingRecord>, StoreError>;

    /// Inserts a new record. `StoreError::Conflict` if the key exists.
    async fn insert(&self, record: &MeetingRecord) -> Result<(), StoreError>;

    /// Atomically adds `participant` to the record's responses.
    /// Returns `true` when the participant was newly added, `false` when
    /// the response was already present. `StoreError::NotFound` if no
    /// record exists for the key.
    async fn append_response(
        &self,
        key: &MeetingKey,
        participant: &UserId,
    ) -> Result<bool, StoreError>;

    /// Atomically sets `finished = true`. Idempotent.
    async fn mark_finished(&self, key: &MeetingKey) -> Result<(), StoreError>;
}
