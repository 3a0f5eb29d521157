pub mod config;
pub mod domain;
pub mod errors;
pub mod meetings;

pub use domain::ack::{AckSource, Acknowledgment};
pub use domain::meeting::{
    AckDecision, ChannelId, MeetingKey, MeetingRecord, MessageTs, UserId,
};
pub use errors::DomainError;
pub use meetings::{
    AckOutcome, AckProcessor, AnnounceError, Announcer, CreateMeeting, FactoryError, IgnoreReason,
    MeetingFactory, MeetingStore, MemoryMeetingStore, ProcessError, StoreError,
};
