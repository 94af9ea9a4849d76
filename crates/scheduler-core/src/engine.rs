//! Orchestration facade: the only place that mixes I/O (repository,
//! suggestion store) with the pure scheduling algorithms. Every public
//! method here awaits its repository calls sequentially; none of them
//! spawn or race.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::candidates::{self, GeneratorInput};
use crate::config::Settings;
use crate::dimensions::{Dimension, DimensionRegistry, NotesPerBeat};
use crate::domain::{AchievementContext, Compound, PracticeEntry, Result, SchedulerError, Signature};
use crate::ports::{PracticeEntryUpdate, Repository};
use crate::progression;
use crate::selection;
use crate::suggestion_store::{Suggestion, SuggestionStore};

pub struct Engine {
    repository: Arc<dyn Repository>,
    suggestion_store: Arc<dyn SuggestionStore>,
    registry: DimensionRegistry,
    settings: Settings,
}

fn all_entry_point_compound(registry: &DimensionRegistry) -> Compound {
    let mut values = BTreeMap::new();
    values.insert("scale".to_string(), registry.scale().entry_point());
    values.insert("position".to_string(), registry.position().entry_point());
    values.insert("rhythm".to_string(), registry.rhythm().entry_point());
    values.insert("note-pattern".to_string(), registry.note_pattern().entry_point());
    values.insert("articulation".to_string(), registry.articulation().entry_point());
    Compound::new(values)
}

fn reasoning_for(changed_dimension: &Option<String>, is_first_ever: bool) -> String {
    if is_first_ever {
        return "Building foundation: starting at the entry point on every dimension.".to_string();
    }
    match changed_dimension {
        None => "Consolidating: staying with this compound to build mastery.".to_string(),
        Some(dim) => format!("Exploring a new {dim} value to expand your range."),
    }
}

impl Engine {
    pub fn new(
        repository: Arc<dyn Repository>,
        suggestion_store: Arc<dyn SuggestionStore>,
        registry: DimensionRegistry,
        settings: Settings,
    ) -> Self {
        Self {
            repository,
            suggestion_store,
            registry,
            settings,
        }
    }

    /// Recent dimension changes, most recent first, derived from the
    /// last few practice log entries.
    async fn recent_changed_dimensions(&self) -> Result<Vec<String>> {
        let recent = self
            .repository
            .get_recent_practice(4)
            .await
            .map_err(SchedulerError::PersistenceFault)?;
        let compounds: Vec<Compound> = recent.iter().map(Compound::from_practice_entry).collect();
        let mut out = Vec::new();
        for pair in compounds.windows(2) {
            if let Some(dim) = crate::domain::changed_dimension(&pair[1], &pair[0]) {
                out.push(dim);
            }
        }
        Ok(out)
    }

    pub async fn generate_compound_suggestion(
        &self,
        rand_unit: &mut dyn FnMut() -> f64,
    ) -> Result<Suggestion> {
        let last = self
            .repository
            .get_last_practice()
            .await
            .map_err(SchedulerError::PersistenceFault)?;
        let current = match &last {
            Some(entry) => Compound::from_practice_entry(entry),
            None => all_entry_point_compound(&self.registry),
        };

        let all_stats = self
            .repository
            .get_all_compound_stats()
            .await
            .map_err(SchedulerError::PersistenceFault)?;
        let current_session = self
            .repository
            .get_current_session()
            .await
            .map_err(SchedulerError::PersistenceFault)?;
        let unlocked: HashSet<String> = self
            .repository
            .get_unlocked_dimensions()
            .await
            .map_err(SchedulerError::PersistenceFault)?
            .into_iter()
            .map(|u| u.dimension)
            .collect();
        let recent_changed_dimensions = self.recent_changed_dimensions().await?;

        let input = GeneratorInput {
            registry: &self.registry,
            settings: &self.settings,
            current: &current,
            all_stats: &all_stats,
            current_session,
            recent_changed_dimensions: &recent_changed_dimensions,
            unlocked_dimensions: &unlocked,
        };
        let pool = candidates::generate(&input);
        let picked = selection::select(&pool, rand_unit);

        let key_idx = (rand_unit() * self.settings.keys.len() as f64).floor() as usize;
        let key = self
            .settings
            .keys
            .get(key_idx.min(self.settings.keys.len().saturating_sub(1)))
            .cloned()
            .unwrap_or_default();

        let suggestion = Suggestion {
            compound: picked.compound.clone(),
            score: picked.score,
            changed_dimension: picked.changed_dimension.clone(),
            reasoning: reasoning_for(&picked.changed_dimension, all_stats.is_empty()),
            key,
        };

        self.suggestion_store
            .save(suggestion.clone())
            .await
            .map_err(SchedulerError::PersistenceFault)?;

        Ok(suggestion)
    }

    /// Logs a practice attempt against an explicit compound, running the
    /// full progression pipeline (§4.6 steps 1-9).
    pub async fn log_compound_practice(
        &self,
        compound: &Compound,
        bpm: u32,
        reasoning: Option<String>,
    ) -> Result<PracticeEntry> {
        if bpm == 0 {
            return Err(SchedulerError::InvalidInput(
                "bpm must be positive".to_string(),
            ));
        }

        let rhythm_sig = compound
            .get("rhythm")
            .ok_or_else(|| SchedulerError::InvalidInput("compound has no rhythm value".to_string()))?;
        let notes_per_beat = self
            .registry
            .rhythm()
            .notes_per_beat(rhythm_sig)
            .ok_or_else(|| SchedulerError::InvalidInput("unknown rhythm value".to_string()))?;
        let npm = crate::normalizer::bpm_to_npm(bpm, notes_per_beat);

        let session = self
            .repository
            .increment_session()
            .await
            .map_err(SchedulerError::PersistenceFault)?;

        let scale = sig_name(compound.get("scale"))?;
        let position = sig_name(compound.get("position"))?;
        let (rhythm_name, rhythm_pattern) = match rhythm_sig {
            Signature::Rhythm { name, pattern } => (name.clone(), pattern.clone()),
            _ => unreachable!("validated above"),
        };
        let note_pattern = compound.get("note-pattern").map(|s| match s {
            Signature::NotePattern { name } => name.clone(),
            _ => unreachable!(),
        });
        let articulation = compound.get("articulation").map(|s| match s {
            Signature::Articulation { name } => name.clone(),
            _ => unreachable!(),
        });
        let key = self.settings.keys.first().cloned().unwrap_or_default();

        let entry = self
            .repository
            .log_practice(
                scale,
                position,
                rhythm_name,
                rhythm_pattern,
                note_pattern,
                articulation,
                key,
                bpm,
                npm,
                reasoning,
            )
            .await
            .map_err(SchedulerError::PersistenceFault)?;

        let alpha = self.settings.ema_alpha;
        let expansion_npm = self.settings.progression.expansion_npm;
        let mastery_npm = self.settings.progression.mastery_npm;
        let mastery_streak = self.settings.progression.mastery_streak;
        let struggling_npm = self.settings.npm_tiers.struggling;

        for name in self.registry.all_names() {
            let Some(value) = compound.get(name) else { continue };
            let sig_id = value.sig_id();
            self.repository
                .update_stats(&sig_id, npm, session, alpha)
                .await
                .map_err(SchedulerError::PersistenceFault)?;
            self.repository
                .update_progression(&sig_id, npm, expansion_npm, mastery_npm, mastery_streak, struggling_npm)
                .await
                .map_err(SchedulerError::PersistenceFault)?;
        }

        let compound_id = compound.compound_id();
        self.repository
            .get_or_create_compound_stats(compound)
            .await
            .map_err(SchedulerError::PersistenceFault)?;
        let tier = progression::max_varied_tier(&self.registry, compound);
        let updated = self
            .repository
            .update_compound_stats(
                &compound_id,
                npm,
                bpm,
                session,
                alpha,
                expansion_npm,
                mastery_npm,
                mastery_streak,
                struggling_npm,
                tier,
            )
            .await
            .map_err(SchedulerError::PersistenceFault)?;

        if updated.has_expanded {
            debug!(compound_id = %compound_id, "compound expanded");
        }
        if updated.is_mastered {
            info!(compound_id = %compound_id, "compound mastered");
        }

        for dimension in self.registry.gated_names() {
            let already_unlocked = self
                .repository
                .is_dimension_unlocked(dimension)
                .await
                .map_err(SchedulerError::PersistenceFault)?;
            if already_unlocked {
                continue;
            }
            let Some(requirement) = self
                .settings
                .dimension_tiers
                .iter()
                .find(|t| t.name == dimension)
                .and_then(|t| t.unlock_requirement)
            else {
                continue;
            };
            let Some(prereq_tier) = progression::prerequisite_tier(&self.registry, dimension) else {
                continue;
            };
            let expanded_count = self
                .repository
                .count_expanded_compounds_in_tier(prereq_tier)
                .await
                .map_err(SchedulerError::PersistenceFault)?;
            if expanded_count >= requirement {
                self.repository
                    .unlock_dimension(dimension, session)
                    .await
                    .map_err(SchedulerError::PersistenceFault)?;
                info!(dimension, session, "dimension unlocked");
            }
        }

        self.suggestion_store
            .clear()
            .await
            .map_err(SchedulerError::PersistenceFault)?;

        let today = entry.logged_at.date_naive();
        let mut streak = self
            .repository
            .get_streak_info()
            .await
            .map_err(SchedulerError::PersistenceFault)?;
        streak.update(today);
        self.repository
            .update_streak_data(
                streak.current_streak,
                streak.longest_streak,
                streak.last_practice_date,
                streak.streak_freezes,
            )
            .await
            .map_err(SchedulerError::PersistenceFault)?;

        self.run_achievement_checks(&streak).await?;

        Ok(entry)
    }

    async fn run_achievement_checks(&self, streak: &crate::domain::StreakInfo) -> Result<()> {
        let already_earned = self
            .repository
            .get_earned_achievement_ids()
            .await
            .map_err(SchedulerError::PersistenceFault)?;

        let ctx = AchievementContext {
            has_any_practice: self
                .repository
                .has_any_practice()
                .await
                .map_err(SchedulerError::PersistenceFault)?,
            any_compound_expanded: self
                .repository
                .count_expanded_compounds()
                .await
                .map_err(SchedulerError::PersistenceFault)?
                > 0,
            any_compound_mastered: self
                .repository
                .count_mastered_compounds()
                .await
                .map_err(SchedulerError::PersistenceFault)?
                > 0,
            mastered_compound_count: self
                .repository
                .count_mastered_compounds()
                .await
                .map_err(SchedulerError::PersistenceFault)?,
            distinct_practiced_scale_values: self
                .repository
                .get_distinct_practiced_values("scale")
                .await
                .map_err(SchedulerError::PersistenceFault)?
                .len() as u32,
            note_pattern_unlocked: self
                .repository
                .is_dimension_unlocked("note-pattern")
                .await
                .map_err(SchedulerError::PersistenceFault)?,
            current_streak: streak.current_streak,
            max_npm_across_compounds: self
                .repository
                .get_max_npm_across_compounds()
                .await
                .map_err(SchedulerError::PersistenceFault)?,
            super_fast_npm_tier: self.settings.npm_tiers.super_fast,
        };

        let newly_earned = crate::domain::achievement::check_achievements(&ctx, &already_earned);
        for id in newly_earned {
            self.repository
                .earn_achievement(id, Utc::now())
                .await
                .map_err(SchedulerError::PersistenceFault)?;
            info!(achievement = id, "achievement earned");

            let is_mastery_category = crate::domain::achievement::CATALOG
                .iter()
                .find(|def| def.id == id)
                .map(|def| def.category == crate::domain::AchievementCategory::Mastery)
                .unwrap_or(false);
            if is_mastery_category {
                self.repository
                    .add_streak_freezes(1)
                    .await
                    .map_err(SchedulerError::PersistenceFault)?;
            }
        }

        Ok(())
    }

    pub async fn recalculate_all_stats(&self) -> Result<()> {
        self.repository
            .recalculate_all_stats(
                self.settings.ema_alpha,
                self.settings.progression.expansion_npm,
                self.settings.progression.mastery_npm,
                self.settings.progression.mastery_streak,
                self.settings.npm_tiers.struggling,
            )
            .await
            .map_err(SchedulerError::PersistenceFault)
    }

    /// Edits an existing practice log entry, then rebuilds every derived
    /// stat from the log (§3: entries are mutable but any mutation
    /// triggers a full rebuild).
    pub async fn edit_practice_entry(&self, id: u64, update: PracticeEntryUpdate) -> Result<()> {
        let existing = self
            .repository
            .get_practice_by_id(id)
            .await
            .map_err(SchedulerError::PersistenceFault)?;
        if existing.is_none() {
            return Err(SchedulerError::MissingPrecondition(format!(
                "no practice entry with id {id}"
            )));
        }
        self.repository
            .update_practice(id, update)
            .await
            .map_err(SchedulerError::PersistenceFault)?;
        self.recalculate_all_stats().await?;
        info!(id, "practice entry edited");
        Ok(())
    }

    /// Deletes a practice log entry, then rebuilds every derived stat
    /// from the log.
    pub async fn delete_practice_entry(&self, id: u64) -> Result<()> {
        let existing = self
            .repository
            .get_practice_by_id(id)
            .await
            .map_err(SchedulerError::PersistenceFault)?;
        if existing.is_none() {
            return Err(SchedulerError::MissingPrecondition(format!(
                "no practice entry with id {id}"
            )));
        }
        self.repository
            .delete_practice(id)
            .await
            .map_err(SchedulerError::PersistenceFault)?;
        self.recalculate_all_stats().await?;
        info!(id, "practice entry deleted");
        Ok(())
    }

    /// Logs the pending suggestion produced by the last
    /// `generate_compound_suggestion` call, at the given `bpm`. Fails with
    /// `MissingPrecondition` if there is no pending suggestion (§7).
    pub async fn log_last_suggestion(&self, bpm: u32) -> Result<PracticeEntry> {
        let suggestion = self
            .suggestion_store
            .load()
            .await
            .map_err(SchedulerError::PersistenceFault)?
            .ok_or_else(|| {
                SchedulerError::MissingPrecondition("no pending suggestion to log".to_string())
            })?;
        self.log_compound_practice(&suggestion.compound, bpm, Some(suggestion.reasoning))
            .await
    }
}

fn sig_name(sig: Option<&Signature>) -> Result<String> {
    match sig {
        Some(Signature::Scale { name }) | Some(Signature::Position { name }) => Ok(name.clone()),
        _ => Err(SchedulerError::InvalidInput(
            "compound is missing a required dimension value".to_string(),
        )),
    }
}
