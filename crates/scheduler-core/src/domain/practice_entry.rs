use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One append-only row in the practice log. Entries may be edited or
/// deleted, but any such mutation requires a full `recalculate_all_stats`
/// replay since derived stats are never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeEntry {
    pub id: u64,
    pub logged_at: DateTime<Utc>,
    pub scale: String,
    pub position: String,
    pub rhythm: String,
    pub rhythm_pattern: String,
    pub note_pattern: Option<String>,
    pub articulation: Option<String>,
    pub key: String,
    pub bpm: u32,
    pub npm: u32,
    pub reasoning: Option<String>,
}
