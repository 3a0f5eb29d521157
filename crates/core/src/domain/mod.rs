pub mod ack;
pub mod meeting;
