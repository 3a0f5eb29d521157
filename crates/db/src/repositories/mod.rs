pub mod meeting;

pub use meeting::SqlMeetingStore;
