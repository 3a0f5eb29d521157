use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// Slack message timestamp, which doubles as the message identifier
/// within a channel.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageTs(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identity of a meeting: the channel and timestamp of its announcement
/// message. Immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeetingKey {
    pub channel: ChannelId,
    pub ts: MessageTs,
}

impl MeetingKey {
    pub fn new(channel: impl Into<String>, ts: impl Into<String>) -> Self {
        Self { channel: ChannelId(channel.into()), ts: MessageTs(ts.into()) }
    }
}

/// The aggregate root. Created once at announcement time, mutated only by
/// the acknowledgment processor, never deleted.
///
/// Invariants:
/// - `responses` is always a subset of `required`
/// - `responses` only grows
/// - `finished` flips to true exactly once, when `responses == required`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub key: MeetingKey,
    pub name: String,
    pub required: BTreeSet<UserId>,
    pub optional: BTreeSet<UserId>,
    pub agenda: String,
    pub end: DateTime<Utc>,
    pub reminder_period_hours: u32,
    pub responses: BTreeSet<UserId>,
    pub finished: bool,
}

/// What the state machine decided about one acknowledgment, before any
/// store write happens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AckDecision {
    /// Record the response. Whether it finishes the meeting is decided
    /// against the stored record after the append, never from this
    /// snapshot, which may already be stale.
    Record,
    AlreadyFinished,
    NotRequired,
    Duplicate,
}

impl MeetingRecord {
    /// Builds an open meeting record for a freshly posted announcement.
    ///
    /// An empty `required` set is rejected here rather than treated as
    /// vacuously finished: a meeting nobody has to attend is an input
    /// mistake, not a completed meeting.
    pub fn open(
        key: MeetingKey,
        name: impl Into<String>,
        required: BTreeSet<UserId>,
        optional: BTreeSet<UserId>,
        agenda: impl Into<String>,
        end: DateTime<Utc>,
        reminder_period_hours: u32,
    ) -> Result<Self, DomainError> {
        if required.is_empty() {
            return Err(DomainError::EmptyRequiredSet);
        }
        if reminder_period_hours == 0 {
            return Err(DomainError::InvalidReminderPeriod);
        }

        Ok(Self {
            key,
            name: name.into(),
            required,
            optional,
            agenda: agenda.into(),
            end,
            reminder_period_hours,
            responses: BTreeSet::new(),
            finished: false,
        })
    }

    /// Pure filtering rule for one acknowledging participant.
    ///
    /// Ordering matters: a finished meeting ignores everything, then
    /// relevance, then duplicates.
    pub fn evaluate(&self, participant: &UserId) -> AckDecision {
        if self.finished {
            return AckDecision::AlreadyFinished;
        }
        if !self.required.contains(participant) {
            return AckDecision::NotRequired;
        }
        if self.responses.contains(participant) {
            return AckDecision::Duplicate;
        }

        AckDecision::Record
    }

    /// Set equality of `responses` against `required`, never a count, so
    /// a participant acknowledging through both channels can never be
    /// double-counted.
    pub fn responses_complete(&self) -> bool {
        self.responses == self.required
    }

    pub fn outstanding(&self) -> BTreeSet<UserId> {
        self.required.difference(&self.responses).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;

    use super::{AckDecision, MeetingKey, MeetingRecord, UserId};

    fn users(ids: &[&str]) -> BTreeSet<UserId> {
        ids.iter().map(|id| UserId((*id).to_string())).collect()
    }

    fn record(required: &[&str], optional: &[&str]) -> MeetingRecord {
        MeetingRecord::open(
            MeetingKey::new("C1", "1730000000.1000"),
            "weekly sync",
            users(required),
            users(optional),
            "what shipped, what's stuck",
            Utc::now(),
            33,
        )
        .expect("valid meeting")
    }

    #[test]
    fn rejects_empty_required_set_at_creation() {
        let error = MeetingRecord::open(
            MeetingKey::new("C1", "1"),
            "ghost meeting",
            BTreeSet::new(),
            users(&["U3"]),
            "",
            Utc::now(),
            33,
        )
        .expect_err("empty required should be rejected");

        assert_eq!(error, crate::errors::DomainError::EmptyRequiredSet);
    }

    #[test]
    fn rejects_zero_reminder_period() {
        let error = MeetingRecord::open(
            MeetingKey::new("C1", "1"),
            "sync",
            users(&["U1"]),
            BTreeSet::new(),
            "",
            Utc::now(),
            0,
        )
        .expect_err("zero reminder period should be rejected");

        assert_eq!(error, crate::errors::DomainError::InvalidReminderPeriod);
    }

    #[test]
    fn required_participant_is_recorded() {
        let record = record(&["U1", "U2"], &["U3"]);
        assert_eq!(record.evaluate(&UserId("U1".to_string())), AckDecision::Record);
    }

    #[test]
    fn responses_complete_exactly_at_set_equality() {
        let mut record = record(&["U1", "U2"], &[]);
        assert!(!record.responses_complete());

        record.responses.insert(UserId("U1".to_string()));
        assert!(!record.responses_complete());

        record.responses.insert(UserId("U2".to_string()));
        assert!(record.responses_complete());
    }

    #[test]
    fn optional_participant_is_not_required() {
        let record = record(&["U1", "U2"], &["U3"]);
        assert_eq!(record.evaluate(&UserId("U3".to_string())), AckDecision::NotRequired);
    }

    #[test]
    fn repeat_acknowledgment_is_a_duplicate() {
        let mut record = record(&["U1", "U2"], &[]);
        record.responses.insert(UserId("U1".to_string()));

        assert_eq!(record.evaluate(&UserId("U1".to_string())), AckDecision::Duplicate);
    }

    #[test]
    fn finished_meeting_ignores_everyone() {
        let mut record = record(&["U1"], &[]);
        record.responses.insert(UserId("U1".to_string()));
        record.finished = true;

        assert_eq!(record.evaluate(&UserId("U1".to_string())), AckDecision::AlreadyFinished);
        assert_eq!(record.evaluate(&UserId("U9".to_string())), AckDecision::AlreadyFinished);
    }

    #[test]
    fn outstanding_lists_required_minus_responses() {
        let mut record = record(&["U1", "U2", "U3"], &[]);
        record.responses.insert(UserId("U2".to_string()));

        assert_eq!(record.outstanding(), users(&["U1", "U3"]));
    }
}
