pub mod error;
pub mod file_suggestion_store;
pub mod in_memory;
pub mod models;
pub mod sqlite;

pub use error::StorageError;
pub use file_suggestion_store::FileSuggestionStore;
pub use in_memory::InMemoryRepository;
pub use sqlite::{init_sqlite_pool, SqliteRepository};
