use serde::{Deserialize, Serialize};

use crate::domain::meeting::{ChannelId, MeetingKey, MessageTs, UserId};

/// Which channel delivered an acknowledgment. Retained for audit logging
/// only; the processor treats both identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckSource {
    Reaction,
    ThreadReply,
}

impl AckSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reaction => "reaction",
            Self::ThreadReply => "thread-reply",
        }
    }
}

/// Canonical form of "one participant responded to one announcement",
/// regardless of whether it arrived as an emoji reaction or a threaded
/// reply. Ephemeral; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Acknowledgment {
    pub channel: ChannelId,
    /// Announcement timestamp. For thread replies this is the thread root,
    /// not the reply's own timestamp.
    pub ts: MessageTs,
    pub participant: UserId,
    pub source: AckSource,
}

impl Acknowledgment {
    pub fn meeting_key(&self) -> MeetingKey {
        MeetingKey { channel: self.channel.clone(), ts: self.ts.clone() }
    }
}
