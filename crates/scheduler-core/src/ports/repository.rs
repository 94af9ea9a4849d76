use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Compound, CompoundStats, PracticeEntry, Proficiency, SignatureStats, StreakInfo};

/// A single field-level patch to an existing practice entry. Any
/// mutation through this port requires the caller to follow up with
/// `recalculate_all_stats`, since derived stats are never patched in
/// place.
#[derive(Debug, Clone)]
pub struct PracticeEntryUpdate {
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

/// Abstract persistence contract consumed by the scheduler core. Every
/// method is implicitly scoped to a single user identity held by the
/// repository instance. No method here ever blocks the core's pure
/// computations; every one is a plain async I/O call, awaited
/// sequentially.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Practice log ---------------------------------------------------
    #[allow(clippy::too_many_arguments)]
    async fn log_practice(
        &self,
        scale: String,
        position: String,
        rhythm: String,
        rhythm_pattern: String,
        note_pattern: Option<String>,
        articulation: Option<String>,
        key: String,
        bpm: u32,
        npm: u32,
        reasoning: Option<String>,
    ) -> anyhow::Result<PracticeEntry>;
    async fn get_last_practice(&self) -> anyhow::Result<Option<PracticeEntry>>;
    async fn get_recent_practice(&self, limit: u32) -> anyhow::Result<Vec<PracticeEntry>>;
    async fn get_all_practice(&self) -> anyhow::Result<Vec<PracticeEntry>>;
    async fn get_practice_by_id(&self, id: u64) -> anyhow::Result<Option<PracticeEntry>>;
    async fn update_practice(&self, id: u64, update: PracticeEntryUpdate) -> anyhow::Result<()>;
    async fn delete_practice(&self, id: u64) -> anyhow::Result<()>;
    async fn has_any_practice(&self) -> anyhow::Result<bool>;
    async fn get_total_practice_count(&self) -> anyhow::Result<u64>;

    // --- Signature stats (legacy) ---------------------------------------
    async fn get_stats(&self, sig_id: &str) -> anyhow::Result<Option<SignatureStats>>;
    async fn get_all_stats(&self) -> anyhow::Result<Vec<SignatureStats>>;
    async fn update_stats(
        &self,
        sig_id: &str,
        npm: u32,
        session: u64,
        alpha: f64,
    ) -> anyhow::Result<()>;
    #[allow(clippy::too_many_arguments)]
    async fn update_progression(
        &self,
        sig_id: &str,
        npm: u32,
        expansion_npm: u32,
        mastery_npm: u32,
        mastery_streak_required: u32,
        struggling_npm: u32,
    ) -> anyhow::Result<()>;

    // --- Session ----------------------------------------------------------
    async fn get_current_session(&self) -> anyhow::Result<u64>;
    async fn increment_session(&self) -> anyhow::Result<u64>;

    // --- Compound stats -----------------------------------------------
    async fn get_compound_stats(&self, compound_id: &str) -> anyhow::Result<Option<CompoundStats>>;
    async fn get_or_create_compound_stats(&self, compound: &Compound) -> anyhow::Result<CompoundStats>;
    #[allow(clippy::too_many_arguments)]
    async fn update_compound_stats(
        &self,
        compound_id: &str,
        npm: u32,
        bpm: u32,
        session: u64,
        alpha: f64,
        expansion_npm: u32,
        mastery_npm: u32,
        mastery_streak_required: u32,
        struggling_npm: u32,
        max_varied_tier: u32,
    ) -> anyhow::Result<CompoundStats>;
    async fn get_all_compound_stats(&self) -> anyhow::Result<Vec<CompoundStats>>;
    /// Compound stats for every compound differing from `compound_id` in
    /// exactly one dimension.
    async fn get_related_compounds(&self, compound_id: &str) -> anyhow::Result<Vec<CompoundStats>>;
    async fn set_compound_expanded(&self, compound_id: &str, expanded: bool) -> anyhow::Result<()>;

    // --- Dimension unlocks -----------------------------------------------
    async fn is_dimension_unlocked(&self, dimension: &str) -> anyhow::Result<bool>;
    async fn unlock_dimension(&self, dimension: &str, session: u64) -> anyhow::Result<()>;
    async fn get_unlocked_dimensions(&self) -> anyhow::Result<Vec<crate::domain::DimensionUnlock>>;
    async fn count_expanded_compounds_in_tier(&self, tier: u32) -> anyhow::Result<u32>;

    // --- Recalculation ------------------------------------------------
    async fn recalculate_all_stats(
        &self,
        alpha: f64,
        expansion_npm: u32,
        mastery_npm: u32,
        mastery_streak_required: u32,
        struggling_npm: u32,
    ) -> anyhow::Result<()>;

    // --- Proficiencies -----------------------------------------------
    async fn set_proficient(&self, dimension: &str, value: &str) -> anyhow::Result<()>;
    async fn remove_proficient(&self, dimension: &str, value: &str) -> anyhow::Result<()>;
    async fn is_proficient(&self, dimension: &str, value: &str) -> anyhow::Result<bool>;
    async fn get_proficiencies(&self, dimension: &str) -> anyhow::Result<Vec<Proficiency>>;
    async fn get_all_proficiencies(&self) -> anyhow::Result<Vec<Proficiency>>;

    // --- Struggling -----------------------------------------------------
    async fn get_struggling_compounds(&self, threshold: u32) -> anyhow::Result<Vec<CompoundStats>>;
    async fn get_struggling_proficiencies(&self, threshold: u32) -> anyhow::Result<Vec<Proficiency>>;

    // --- Streak -----------------------------------------------------------
    async fn get_streak_info(&self) -> anyhow::Result<StreakInfo>;
    async fn update_streak_data(
        &self,
        current: u32,
        longest: u32,
        last_date: Option<NaiveDate>,
        freezes: u32,
    ) -> anyhow::Result<()>;
    async fn add_streak_freezes(&self, n: u32) -> anyhow::Result<()>;

    // --- Achievements -----------------------------------------------------
    async fn earn_achievement(&self, id: &str, earned_at: DateTime<Utc>) -> anyhow::Result<()>;
    async fn has_achievement(&self, id: &str) -> anyhow::Result<bool>;
    async fn get_earned_achievement_ids(&self) -> anyhow::Result<Vec<String>>;

    // --- Aggregate helpers -----------------------------------------------
    async fn get_max_npm_across_compounds(&self) -> anyhow::Result<u32>;
    async fn count_mastered_compounds(&self) -> anyhow::Result<u32>;
    async fn count_expanded_compounds(&self) -> anyhow::Result<u32>;
    async fn get_mastered_positions(&self) -> anyhow::Result<Vec<String>>;
    async fn get_distinct_practiced_values(&self, dimension: &str) -> anyhow::Result<Vec<String>>;
}
