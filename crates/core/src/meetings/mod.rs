//! Meeting lifecycle: the store port, the creation factory, and the
//! acknowledgment processor that drives a meeting from open to finished.

mod factory;
mod memory;
mod processor;
mod store;

pub use factory::{AnnounceError, Announcer, CreateMeeting, FactoryError, MeetingFactory};
pub use memory::MemoryMeetingStore;
pub use processor::{AckOutcome, AckProcessor, IgnoreReason, ProcessError};
pub use store::{MeetingStore, StoreError};
