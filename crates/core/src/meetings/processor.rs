use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::ack::Acknowledgment;
use crate::domain::meeting::AckDecision;
use crate::meetings::store::{MeetingStore, StoreError};

/// Why an acknowledgment was dropped. All of these are expected traffic,
/// not errors; they are traced at debug level and never surfaced to the
/// acknowledging user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownMeeting,
    AlreadyFinished,
    NotRequired,
    Duplicate,
}

impl IgnoreReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnknownMeeting => "unknown-meeting",
            Self::AlreadyFinished => "already-finished",
            Self::NotRequired => "not-required",
            Self::Duplicate => "duplicate",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AckOutcome {
    /// Response recorded, required attendees still outstanding.
    Recorded,
    /// Response recorded and it was the last one: the meeting is finished.
    Completed,
    Ignored(IgnoreReason),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProcessError {
    #[error("store failure while processing acknowledgment: {0}")]
    Store(#[from] StoreError),
}

/// Applies canonical acknowledgments to meeting records.
///
/// Both inbound sources feed this single path, so the idempotency and
/// completion rules cannot drift between the reaction handler and the
/// thread-reply handler. One attempt per event, no retries; store faults
/// propagate to the dispatching adapter.
pub struct AckProcessor {
    store: Arc<dyn MeetingStore>,
}

impl AckProcessor {
    pub fn new(store: Arc<dyn MeetingStore>) -> Self {
        Self { store }
    }

    pub async fn process(&self, ack: &Acknowledgment) -> Result<AckOutcome, ProcessError> {
        let key = ack.meeting_key();

        let Some(record) = self.store.get(&key).await? else {
            // The event may target a purged meeting or be plain noise.
            debug!(
                channel = %key.channel.0,
                ts = %key.ts.0,
                participant = %ack.participant.0,
                source = ack.source.label(),
                "acknowledgment for unknown meeting dropped"
            );
            return Ok(AckOutcome::Ignored(IgnoreReason::UnknownMeeting));
        };

        match record.evaluate(&ack.participant) {
            AckDecision::AlreadyFinished => {
                return Ok(AckOutcome::Ignored(IgnoreReason::AlreadyFinished))
            }
            AckDecision::NotRequired => {
                return Ok(AckOutcome::Ignored(IgnoreReason::NotRequired))
            }
            AckDecision::Duplicate => return Ok(AckOutcome::Ignored(IgnoreReason::Duplicate)),
            AckDecision::Record => {}
        }

        // Append before the completion write: a crash in between leaves the
        // response durable, and the next acknowledgment re-detects equality.
        self.store.append_response(&key, &ack.participant).await?;

        // Completion is judged from a re-read taken after our own append,
        // not from the snapshot above. When the last two distinct required
        // participants acknowledge concurrently, both snapshots predate
        // both appends; the later re-read still observes the full set, so
        // at least one handler fires the completion write.
        let completes = self
            .store
            .get(&key)
            .await?
            .is_some_and(|updated| updated.responses_complete());

        if completes {
            self.store.mark_finished(&key).await?;
            info!(
                channel = %key.channel.0,
                ts = %key.ts.0,
                participant = %ack.participant.0,
                source = ack.source.label(),
                "meeting finished: all required attendees acknowledged"
            );
            return Ok(AckOutcome::Completed);
        }

        debug!(
            channel = %key.channel.0,
            ts = %key.ts.0,
            participant = %ack.participant.0,
            source = ack.source.label(),
            "acknowledgment recorded"
        );
        Ok(AckOutcome::Recorded)
    }
}
