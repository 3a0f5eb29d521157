use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::domain::meeting::{ChannelId, MeetingKey, MeetingRecord, UserId};
use crate::errors::DomainError;
use crate::meetings::store::{MeetingStore, StoreError};

/// Validated creation request, as collected from the modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateMeeting {
    pub name: String,
    pub required: BTreeSet<UserId>,
    pub optional: BTreeSet<UserId>,
    pub agenda: String,
    pub end: DateTime<Utc>,
    pub reminder_period_hours: u32,
}

impl CreateMeeting {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.required.is_empty() {
            return Err(DomainError::EmptyRequiredSet);
        }
        if self.reminder_period_hours == 0 {
            return Err(DomainError::InvalidReminderPeriod);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("announcement delivery failed: {0}")]
pub struct AnnounceError(pub String);

/// The injected message-posting capability. Posting the announcement is
/// what mints the meeting identity.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn announce(
        &self,
        channel: &ChannelId,
        meeting: &CreateMeeting,
    ) -> Result<MeetingKey, AnnounceError>;
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FactoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Announce(#[from] AnnounceError),
    /// A record already exists under the announcement identity. Message
    /// timestamps are unique per post, so this indicates a bug or a genuine
    /// collision; it is surfaced, never retried silently.
    #[error("meeting creation collided with an existing record")]
    Conflict,
    #[error("store failure while creating meeting: {0}")]
    Store(StoreError),
}

/// Turns a creation request into a persisted, announced meeting record.
pub struct MeetingFactory {
    store: Arc<dyn MeetingStore>,
}

impl MeetingFactory {
    pub fn new(store: Arc<dyn MeetingStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        channel: &ChannelId,
        request: CreateMeeting,
        announcer: &dyn Announcer,
    ) -> Result<MeetingRecord, FactoryError> {
        // Validate before posting anything: a rejected request must not
        // leave a stray announcement in the channel.
        request.validate()?;

        let key = announcer.announce(channel, &request).await?;
        let record = MeetingRecord::open(
            key,
            request.name,
            request.required,
            request.optional,
            request.agenda,
            request.end,
            request.reminder_period_hours,
        )?;

        match self.store.insert(&record).await {
            Ok(()) => {
                info!(
                    channel = %record.key.channel.0,
                    ts = %record.key.ts.0,
                    name = %record.name,
                    required = record.required.len(),
                    optional = record.optional.len(),
                    "meeting created and announced"
                );
                Ok(record)
            }
            Err(StoreError::Conflict) => Err(FactoryError::Conflict),
            Err(other) => Err(FactoryError::Store(other)),
        }
    }
}
