pub mod repository;

pub use repository::{PracticeEntryUpdate, Repository};

#[cfg(any(test, feature = "testing"))]
pub use repository::MockRepository;
