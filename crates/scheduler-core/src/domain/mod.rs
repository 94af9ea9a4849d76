pub mod achievement;
pub mod compound;
pub mod error;
pub mod practice_entry;
pub mod proficiency;
pub mod signature;
pub mod stats;
pub mod streak;
pub mod unlock;

pub use achievement::{AchievementCategory, AchievementContext, AchievementDef, EarnedAchievement};
pub use compound::{changed_dimension, compounds_equal, count_dimension_changes, Compound};
pub use error::{Result, SchedulerError};
pub use practice_entry::PracticeEntry;
pub use proficiency::Proficiency;
pub use signature::Signature;
pub use stats::{CompoundStats, SignatureStats};
pub use streak::StreakInfo;
pub use unlock::DimensionUnlock;
