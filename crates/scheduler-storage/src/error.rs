use thiserror::Error;

/// Storage-layer failures, converted into `SchedulerError::PersistenceFault`
/// at the port boundary via `anyhow::Error`'s blanket `From`.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
