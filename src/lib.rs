//! Thin facade tying `scheduler-core` (dimension model, algorithms,
//! ports) to `scheduler-storage` (repository implementations). Hosts
//! (CLI/HTTP/UI) wire an `Engine` from these re-exports; this crate adds
//! no behavior of its own.

pub use scheduler_core::*;
pub use scheduler_storage::{FileSuggestionStore, InMemoryRepository, SqliteRepository, StorageError};
