use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Records that a dimension unlocked at a given session, for dimensions
/// with tier >= 1. Tier-0 dimensions are implicitly always unlocked and
/// never get a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionUnlock {
    pub dimension: String,
    pub unlocked_at_session: u64,
    pub unlocked_at: DateTime<Utc>,
}
