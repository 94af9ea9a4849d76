use thiserror::Error;

/// Errors produced by the scheduler core, categorized behaviorally rather
/// than by type, per the error handling design: `NotFound` is never a
/// variant here, since legitimately-empty lookups return `Option`/`None`
/// at the repository boundary instead.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Malformed compound/signature ID, non-positive BPM, unknown
    /// dimension name, or a value outside a dimension's value set.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation that requires prior state found none, e.g. logging
    /// the last suggestion with no pending suggestion, or updating a
    /// practice entry that does not exist.
    #[error("missing precondition: {0}")]
    MissingPrecondition(String),

    /// The storage backend failed. Not retried inside the core; the host
    /// decides what to do with it.
    #[error("persistence fault: {0}")]
    PersistenceFault(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
