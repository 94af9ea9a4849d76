//! HashMap/RwLock-backed repository, the primary vehicle for tests. A
//! single lock guards all state; given the core's single-threaded
//! per-user cooperative model (see scheduler-core's concurrency notes)
//! this never contends under normal use.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use scheduler_core::domain::{
    Compound, CompoundStats, DimensionUnlock, PracticeEntry, Proficiency, Signature, SignatureStats,
    StreakInfo,
};
use scheduler_core::ports::{PracticeEntryUpdate, Repository};

#[derive(Default)]
struct State {
    practice_log: Vec<PracticeEntry>,
    next_practice_id: u64,
    session: u64,
    signature_stats: HashMap<String, SignatureStats>,
    compound_stats: HashMap<String, CompoundStats>,
    unlocked_dimensions: HashMap<String, DimensionUnlock>,
    proficiencies: HashMap<(String, String), Proficiency>,
    streak: StreakInfo,
    achievements: HashMap<String, DateTime<Utc>>,
}

#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
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
    ) -> anyhow::Result<PracticeEntry> {
        let mut state = self.state.write().unwrap();
        state.next_practice_id += 1;
        let entry = PracticeEntry {
            id: state.next_practice_id,
            logged_at: Utc::now(),
            scale,
            position,
            rhythm,
            rhythm_pattern,
            note_pattern,
            articulation,
            key,
            bpm,
            npm,
            reasoning,
        };
        state.practice_log.push(entry.clone());
        Ok(entry)
    }

    async fn get_last_practice(&self) -> anyhow::Result<Option<PracticeEntry>> {
        Ok(self.state.read().unwrap().practice_log.last().cloned())
    }

    async fn get_recent_practice(&self, limit: u32) -> anyhow::Result<Vec<PracticeEntry>> {
        let state = self.state.read().unwrap();
        Ok(state
            .practice_log
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_all_practice(&self) -> anyhow::Result<Vec<PracticeEntry>> {
        Ok(self.state.read().unwrap().practice_log.clone())
    }

    async fn get_practice_by_id(&self, id: u64) -> anyhow::Result<Option<PracticeEntry>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .practice_log
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn update_practice(&self, id: u64, update: PracticeEntryUpdate) -> anyhow::Result<()> {
        let mut state = self.state.write().unwrap();
        let entry = state
            .practice_log
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| anyhow::anyhow!("practice entry {id} not found"))?;
        entry.scale = update.scale;
        entry.position = update.position;
        entry.rhythm = update.rhythm;
        entry.rhythm_pattern = update.rhythm_pattern;
        entry.note_pattern = update.note_pattern;
        entry.articulation = update.articulation;
        entry.key = update.key;
        entry.bpm = update.bpm;
        entry.npm = update.npm;
        entry.reasoning = update.reasoning;
        Ok(())
    }

    async fn delete_practice(&self, id: u64) -> anyhow::Result<()> {
        self.state.write().unwrap().practice_log.retain(|e| e.id != id);
        Ok(())
    }

    async fn has_any_practice(&self) -> anyhow::Result<bool> {
        Ok(!self.state.read().unwrap().practice_log.is_empty())
    }

    async fn get_total_practice_count(&self) -> anyhow::Result<u64> {
        Ok(self.state.read().unwrap().practice_log.len() as u64)
    }

    async fn get_stats(&self, sig_id: &str) -> anyhow::Result<Option<SignatureStats>> {
        Ok(self.state.read().unwrap().signature_stats.get(sig_id).cloned())
    }

    async fn get_all_stats(&self) -> anyhow::Result<Vec<SignatureStats>> {
        Ok(self.state.read().unwrap().signature_stats.values().cloned().collect())
    }

    async fn update_stats(&self, sig_id: &str, npm: u32, session: u64, alpha: f64) -> anyhow::Result<()> {
        let mut state = self.state.write().unwrap();
        let entry = state
            .signature_stats
            .entry(sig_id.to_string())
            .or_insert_with(|| SignatureStats::new(sig_id));
        entry.attempts += 1;
        entry.best_npm = entry.best_npm.max(npm);
        entry.ema_npm = scheduler_core::normalizer::ema(entry.ema_npm, npm as f64, alpha);
        entry.last_npm = npm;
        entry.last_seen_session = Some(session);
        Ok(())
    }

    async fn update_progression(
        &self,
        sig_id: &str,
        npm: u32,
        expansion_npm: u32,
        mastery_npm: u32,
        mastery_streak_required: u32,
        struggling_npm: u32,
    ) -> anyhow::Result<()> {
        let mut state = self.state.write().unwrap();
        let entry = state
            .signature_stats
            .entry(sig_id.to_string())
            .or_insert_with(|| SignatureStats::new(sig_id));
        if npm >= expansion_npm {
            entry.has_expanded = true;
        }
        if npm >= mastery_npm {
            entry.mastery_streak += 1;
        } else {
            entry.mastery_streak = 0;
        }
        if entry.mastery_streak >= mastery_streak_required {
            entry.is_mastered = true;
        }
        if npm < struggling_npm {
            entry.struggling_streak += 1;
        } else {
            entry.struggling_streak = 0;
        }
        Ok(())
    }

    async fn get_current_session(&self) -> anyhow::Result<u64> {
        Ok(self.state.read().unwrap().session)
    }

    async fn increment_session(&self) -> anyhow::Result<u64> {
        let mut state = self.state.write().unwrap();
        state.session += 1;
        Ok(state.session)
    }

    async fn get_compound_stats(&self, compound_id: &str) -> anyhow::Result<Option<CompoundStats>> {
        Ok(self.state.read().unwrap().compound_stats.get(compound_id).cloned())
    }

    async fn get_or_create_compound_stats(&self, compound: &Compound) -> anyhow::Result<CompoundStats> {
        let mut state = self.state.write().unwrap();
        let id = compound.compound_id();
        Ok(state
            .compound_stats
            .entry(id.clone())
            .or_insert_with(|| CompoundStats::new(id))
            .clone())
    }

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
    ) -> anyhow::Result<CompoundStats> {
        let mut state = self.state.write().unwrap();
        let entry = state
            .compound_stats
            .entry(compound_id.to_string())
            .or_insert_with(|| CompoundStats::new(compound_id));
        entry.apply_attempt(
            npm,
            bpm,
            session,
            alpha,
            expansion_npm,
            mastery_npm,
            mastery_streak_required,
            struggling_npm,
        );
        entry.max_varied_tier = entry.max_varied_tier.max(max_varied_tier);
        Ok(entry.clone())
    }

    async fn get_all_compound_stats(&self) -> anyhow::Result<Vec<CompoundStats>> {
        Ok(self.state.read().unwrap().compound_stats.values().cloned().collect())
    }

    async fn get_related_compounds(&self, compound_id: &str) -> anyhow::Result<Vec<CompoundStats>> {
        let state = self.state.read().unwrap();
        let Ok(target) = Compound::parse_compound_id(compound_id) else {
            return Ok(Vec::new());
        };
        Ok(state
            .compound_stats
            .values()
            .filter(|s| {
                s.compound_id != compound_id
                    && Compound::parse_compound_id(&s.compound_id)
                        .map(|c| scheduler_core::domain::changed_dimension(&target, &c).is_some())
                        .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn set_compound_expanded(&self, compound_id: &str, expanded: bool) -> anyhow::Result<()> {
        let mut state = self.state.write().unwrap();
        if let Some(entry) = state.compound_stats.get_mut(compound_id) {
            entry.has_expanded = expanded;
        }
        Ok(())
    }

    async fn is_dimension_unlocked(&self, dimension: &str) -> anyhow::Result<bool> {
        Ok(matches!(dimension, "scale" | "position" | "rhythm")
            || self.state.read().unwrap().unlocked_dimensions.contains_key(dimension))
    }

    async fn unlock_dimension(&self, dimension: &str, session: u64) -> anyhow::Result<()> {
        let mut state = self.state.write().unwrap();
        state
            .unlocked_dimensions
            .entry(dimension.to_string())
            .or_insert_with(|| DimensionUnlock {
                dimension: dimension.to_string(),
                unlocked_at_session: session,
                unlocked_at: Utc::now(),
            });
        Ok(())
    }

    async fn get_unlocked_dimensions(&self) -> anyhow::Result<Vec<DimensionUnlock>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .unlocked_dimensions
            .values()
            .cloned()
            .collect())
    }

    async fn count_expanded_compounds_in_tier(&self, tier: u32) -> anyhow::Result<u32> {
        Ok(self
            .state
            .read()
            .unwrap()
            .compound_stats
            .values()
            .filter(|s| s.has_expanded && s.max_varied_tier <= tier)
            .count() as u32)
    }

    async fn recalculate_all_stats(
        &self,
        alpha: f64,
        expansion_npm: u32,
        mastery_npm: u32,
        mastery_streak_required: u32,
        struggling_npm: u32,
    ) -> anyhow::Result<()> {
        let mut state = self.state.write().unwrap();
        state.signature_stats.clear();
        state.compound_stats.clear();
        state.session = 0;

        let log = state.practice_log.clone();
        for (i, entry) in log.iter().enumerate() {
            let session = (i + 1) as u64;
            state.session = session;

            for sig_id in [
                format!("scale:{}", entry.scale),
                format!("position:{}", entry.position),
                format!("rhythm:{}:{}", entry.rhythm, entry.rhythm_pattern),
            ] {
                let stats = state
                    .signature_stats
                    .entry(sig_id.clone())
                    .or_insert_with(|| SignatureStats::new(sig_id));
                stats.apply_attempt(
                    entry.npm,
                    session,
                    alpha,
                    expansion_npm,
                    mastery_npm,
                    mastery_streak_required,
                    struggling_npm,
                );
            }

            let compound_id = Compound::from_practice_entry(entry).compound_id();
            let compound_stats = state
                .compound_stats
                .entry(compound_id.clone())
                .or_insert_with(|| CompoundStats::new(compound_id));
            compound_stats.apply_attempt(
                entry.npm,
                entry.bpm,
                session,
                alpha,
                expansion_npm,
                mastery_npm,
                mastery_streak_required,
                struggling_npm,
            );
        }
        Ok(())
    }

    async fn set_proficient(&self, dimension: &str, value: &str) -> anyhow::Result<()> {
        let mut state = self.state.write().unwrap();
        state.proficiencies.insert(
            (dimension.to_string(), value.to_string()),
            Proficiency {
                dimension: dimension.to_string(),
                value: value.to_string(),
            },
        );
        Ok(())
    }

    async fn remove_proficient(&self, dimension: &str, value: &str) -> anyhow::Result<()> {
        self.state
            .write()
            .unwrap()
            .proficiencies
            .remove(&(dimension.to_string(), value.to_string()));
        Ok(())
    }

    async fn is_proficient(&self, dimension: &str, value: &str) -> anyhow::Result<bool> {
        Ok(self
            .state
            .read()
            .unwrap()
            .proficiencies
            .contains_key(&(dimension.to_string(), value.to_string())))
    }

    async fn get_proficiencies(&self, dimension: &str) -> anyhow::Result<Vec<Proficiency>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .proficiencies
            .values()
            .filter(|p| p.dimension == dimension)
            .cloned()
            .collect())
    }

    async fn get_all_proficiencies(&self) -> anyhow::Result<Vec<Proficiency>> {
        Ok(self.state.read().unwrap().proficiencies.values().cloned().collect())
    }

    async fn get_struggling_compounds(&self, threshold: u32) -> anyhow::Result<Vec<CompoundStats>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .compound_stats
            .values()
            .filter(|s| s.struggling_streak >= threshold)
            .cloned()
            .collect())
    }

    async fn get_struggling_proficiencies(&self, threshold: u32) -> anyhow::Result<Vec<Proficiency>> {
        let state = self.state.read().unwrap();
        Ok(state
            .proficiencies
            .values()
            .filter(|p| {
                state.signature_stats.values().any(|s| {
                    s.struggling_streak >= threshold
                        && Signature::parse(&s.sig_id)
                            .map(|sig| sig.dimension_name() == p.dimension && sig.value_name() == p.value)
                            .unwrap_or(false)
                })
            })
            .cloned()
            .collect())
    }

    async fn get_streak_info(&self) -> anyhow::Result<StreakInfo> {
        Ok(self.state.read().unwrap().streak.clone())
    }

    async fn update_streak_data(
        &self,
        current: u32,
        longest: u32,
        last_date: Option<NaiveDate>,
        freezes: u32,
    ) -> anyhow::Result<()> {
        let mut state = self.state.write().unwrap();
        state.streak = StreakInfo {
            current_streak: current,
            longest_streak: longest,
            last_practice_date: last_date,
            streak_freezes: freezes,
        };
        Ok(())
    }

    async fn add_streak_freezes(&self, n: u32) -> anyhow::Result<()> {
        self.state.write().unwrap().streak.add_freezes(n);
        Ok(())
    }

    async fn earn_achievement(&self, id: &str, earned_at: DateTime<Utc>) -> anyhow::Result<()> {
        self.state
            .write()
            .unwrap()
            .achievements
            .entry(id.to_string())
            .or_insert(earned_at);
        Ok(())
    }

    async fn has_achievement(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self.state.read().unwrap().achievements.contains_key(id))
    }

    async fn get_earned_achievement_ids(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.state.read().unwrap().achievements.keys().cloned().collect())
    }

    async fn get_max_npm_across_compounds(&self) -> anyhow::Result<u32> {
        Ok(self
            .state
            .read()
            .unwrap()
            .compound_stats
            .values()
            .map(|s| s.best_npm)
            .max()
            .unwrap_or(0))
    }

    async fn count_mastered_compounds(&self) -> anyhow::Result<u32> {
        Ok(self
            .state
            .read()
            .unwrap()
            .compound_stats
            .values()
            .filter(|s| s.is_mastered)
            .count() as u32)
    }

    async fn count_expanded_compounds(&self) -> anyhow::Result<u32> {
        Ok(self
            .state
            .read()
            .unwrap()
            .compound_stats
            .values()
            .filter(|s| s.has_expanded)
            .count() as u32)
    }

    async fn get_mastered_positions(&self) -> anyhow::Result<Vec<String>> {
        let state = self.state.read().unwrap();
        Ok(state
            .compound_stats
            .values()
            .filter(|s| s.is_mastered)
            .filter_map(|s| Compound::parse_compound_id(&s.compound_id).ok())
            .filter_map(|c| match c.get("position") {
                Some(scheduler_core::domain::Signature::Position { name }) => Some(name.clone()),
                _ => None,
            })
            .collect())
    }

    async fn get_distinct_practiced_values(&self, dimension: &str) -> anyhow::Result<Vec<String>> {
        let state = self.state.read().unwrap();
        let mut values: Vec<String> = state
            .practice_log
            .iter()
            .filter_map(|entry| match dimension {
                "scale" => Some(entry.scale.clone()),
                "position" => Some(entry.position.clone()),
                "rhythm" => Some(entry.rhythm.clone()),
                "note-pattern" => entry.note_pattern.clone(),
                "articulation" => entry.articulation.clone(),
                _ => None,
            })
            .collect();
        values.sort();
        values.dedup();
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_increments_and_practice_log_appends() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_current_session().await.unwrap(), 0);
        assert_eq!(repo.increment_session().await.unwrap(), 1);

        let entry = repo
            .log_practice(
                "pentatonic_minor".to_string(),
                "E".to_string(),
                "8ths".to_string(),
                "xx".to_string(),
                None,
                None,
                "C".to_string(),
                210,
                420,
                None,
            )
            .await
            .unwrap();
        assert_eq!(entry.id, 1);
        assert_eq!(repo.get_total_practice_count().await.unwrap(), 1);
        assert!(repo.has_any_practice().await.unwrap());
    }

    #[tokio::test]
    async fn achievements_are_idempotent() {
        let repo = InMemoryRepository::new();
        let now = Utc::now();
        repo.earn_achievement("first-practice", now).await.unwrap();
        repo.earn_achievement("first-practice", Utc::now()).await.unwrap();
        assert_eq!(repo.get_earned_achievement_ids().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn struggling_proficiencies_cross_reference_signature_stats() {
        let repo = InMemoryRepository::new();
        repo.set_proficient("scale", "pentatonic_minor").await.unwrap();
        repo.set_proficient("scale", "pentatonic_major").await.unwrap();

        repo.update_progression("scale:pentatonic_minor", 100, 400, 480, 3, 200)
            .await
            .unwrap();
        repo.update_progression("scale:pentatonic_minor", 100, 400, 480, 3, 200)
            .await
            .unwrap();
        repo.update_progression("scale:pentatonic_major", 500, 400, 480, 3, 200)
            .await
            .unwrap();

        let struggling = repo.get_struggling_proficiencies(2).await.unwrap();
        assert_eq!(struggling.len(), 1);
        assert_eq!(struggling[0].value, "pentatonic_minor");
    }
}
