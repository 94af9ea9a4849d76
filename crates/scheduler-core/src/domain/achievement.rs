use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Mastery,
    Exploration,
    Consistency,
    Speed,
}

/// An earned achievement row. IDs are immutable strings, never reused or
/// renumbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedAchievement {
    pub id: String,
    pub earned_at: DateTime<Utc>,
}

/// The aggregate facts an achievement check needs, gathered by the
/// progression controller from already-fetched repository data. Kept as
/// a plain snapshot so `check` stays a pure, synchronous function.
#[derive(Debug, Clone, Default)]
pub struct AchievementContext {
    pub has_any_practice: bool,
    pub any_compound_expanded: bool,
    pub any_compound_mastered: bool,
    pub mastered_compound_count: u32,
    pub distinct_practiced_scale_values: u32,
    pub note_pattern_unlocked: bool,
    pub current_streak: u32,
    pub max_npm_across_compounds: u32,
    pub super_fast_npm_tier: u32,
}

pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: AchievementCategory,
    pub check: fn(&AchievementContext) -> bool,
}

/// The starter catalog. IDs here are permanent identifiers, never reused.
pub const CATALOG: &[AchievementDef] = &[
    AchievementDef {
        id: "first-practice",
        name: "First Practice",
        description: "Logged your first practice attempt.",
        category: AchievementCategory::Exploration,
        check: |ctx| ctx.has_any_practice,
    },
    AchievementDef {
        id: "first-expansion",
        name: "First Expansion",
        description: "Reached the expansion threshold on a compound.",
        category: AchievementCategory::Mastery,
        check: |ctx| ctx.any_compound_expanded,
    },
    AchievementDef {
        id: "first-mastery",
        name: "First Mastery",
        description: "Mastered a compound.",
        category: AchievementCategory::Mastery,
        check: |ctx| ctx.any_compound_mastered,
    },
    AchievementDef {
        id: "five-mastered",
        name: "Five Mastered",
        description: "Mastered five distinct compounds.",
        category: AchievementCategory::Mastery,
        check: |ctx| ctx.mastered_compound_count >= 5,
    },
    AchievementDef {
        id: "explorer",
        name: "Explorer",
        description: "Practiced at least three distinct scales.",
        category: AchievementCategory::Exploration,
        check: |ctx| ctx.distinct_practiced_scale_values >= 3,
    },
    AchievementDef {
        id: "note-pattern-unlocked",
        name: "Beyond the Scale",
        description: "Unlocked the note-pattern dimension.",
        category: AchievementCategory::Exploration,
        check: |ctx| ctx.note_pattern_unlocked,
    },
    AchievementDef {
        id: "week-streak",
        name: "Week Streak",
        description: "Practiced seven days in a row.",
        category: AchievementCategory::Consistency,
        check: |ctx| ctx.current_streak >= 7,
    },
    AchievementDef {
        id: "speed-demon",
        name: "Speed Demon",
        description: "Reached the super-fast NPM tier on any compound.",
        category: AchievementCategory::Speed,
        check: |ctx| ctx.max_npm_across_compounds >= ctx.super_fast_npm_tier,
    },
];

/// Evaluates every not-yet-earned achievement in the catalog against
/// `ctx`, returning the IDs that newly pass. Idempotent given the same
/// `already_earned` set and `ctx`.
pub fn check_achievements(ctx: &AchievementContext, already_earned: &[String]) -> Vec<&'static str> {
    CATALOG
        .iter()
        .filter(|def| !already_earned.iter().any(|id| id == def.id))
        .filter(|def| (def.check)(ctx))
        .map(|def| def.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newly_earned_excludes_already_earned_ids() {
        let ctx = AchievementContext {
            has_any_practice: true,
            ..Default::default()
        };
        let newly = check_achievements(&ctx, &[]);
        assert!(newly.contains(&"first-practice"));

        let newly_again = check_achievements(&ctx, &["first-practice".to_string()]);
        assert!(!newly_again.contains(&"first-practice"));
    }

    #[test]
    fn speed_demon_compares_against_configured_tier() {
        let ctx = AchievementContext {
            max_npm_across_compounds: 560,
            super_fast_npm_tier: 560,
            ..Default::default()
        };
        assert!(check_achievements(&ctx, &[]).contains(&"speed-demon"));
    }
}
