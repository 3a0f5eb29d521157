use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("a meeting needs at least one required attendee")]
    EmptyRequiredSet,
    #[error("reminder period must be a positive number of hours")]
    InvalidReminderPeriod,
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}
