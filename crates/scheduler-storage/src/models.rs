//! Database row types for the sqlite-backed repository.

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct PracticeEntryRow {
    pub id: i64,
    pub logged_at: String,
    pub scale: String,
    pub position: String,
    pub rhythm: String,
    pub rhythm_pattern: String,
    pub note_pattern: Option<String>,
    pub articulation: Option<String>,
    pub key: String,
    pub bpm: i64,
    pub npm: i64,
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SignatureStatsRow {
    pub sig_id: String,
    pub attempts: i64,
    pub best_npm: i64,
    pub ema_npm: f64,
    pub last_npm: i64,
    pub last_seen_session: Option<i64>,
    pub has_expanded: i64,
    pub mastery_streak: i64,
    pub is_mastered: i64,
    pub struggling_streak: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct CompoundStatsRow {
    pub compound_id: String,
    pub attempts: i64,
    pub best_npm: i64,
    pub ema_npm: f64,
    pub last_npm: i64,
    pub last_bpm: i64,
    pub has_expanded: i64,
    pub mastery_streak: i64,
    pub is_mastered: i64,
    pub struggling_streak: i64,
    pub last_practiced_session: Option<i64>,
    pub max_varied_tier: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DimensionUnlockRow {
    pub dimension: String,
    pub unlocked_at_session: i64,
    pub unlocked_at: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProficiencyRow {
    pub dimension: String,
    pub value: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct StreakRow {
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_practice_date: Option<String>,
    pub streak_freezes: i64,
}
